use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Configuration file '{0}' is not valid")]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("Failed to serialize configuration")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to write configuration file '{0}'")]
    Write(PathBuf, #[source] std::io::Error),

    #[error("No 'api_key' in section [solaredge] of the configuration")]
    MissingCredential,

    #[error("Unknown timezone '{0}' in section [location]")]
    InvalidTimezone(String),

    #[error("Soft request limit {soft} is above the hard limit {hard}")]
    InconsistentBudget { soft: u32, hard: u32 },

    #[error("The API key gives access to no site")]
    NoSites,

    #[error("The API key gives access to several sites ({0:?}); set 'site_id' in section [solaredge]")]
    MultipleSites(Vec<u64>),
}
