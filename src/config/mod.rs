//! TOML run configuration.
//!
//! Every field except the SolarEdge API key has a default, so a minimal file is:
//!
//! ```toml
//! [solaredge]
//! api_key = "..."
//! ```

pub mod error;

use crate::clients::knmi::{FORECAST_URL, HISTORY_URL};
use crate::clients::rate_limited_client::SOLAREDGE_BASE_URL;
use crate::config::error::ConfigError;
use chrono_tz::Tz;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_ENV: &str = "SOLAR_DATASET_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolarEdgeConfig {
    pub api_key: String,
    /// Discovered and written back when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_id: Option<u64>,
    pub base_url: String,
}

impl Default for SolarEdgeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            site_id: None,
            base_url: SOLAREDGE_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetConfig {
    pub soft_limit: u32,
    pub hard_limit: u32,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            soft_limit: 250,
            hard_limit: 275,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub latitude: f64,
    pub longitude: f64,
    /// IANA name of the zone the inverter reports local time in.
    pub timezone: String,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            latitude: 51.2,
            longitude: 6.0,
            timezone: "Europe/Amsterdam".to_string(),
        }
    }
}

impl LocationConfig {
    pub fn tz(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::InvalidTimezone(self.timezone.clone()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnmiConfig {
    /// Station for the hourly history.
    pub station: String,
    pub history_url: String,
    pub forecast_url: String,
    /// Station for the iPluim forecast.
    pub forecast_station: String,
}

impl Default for KnmiConfig {
    fn default() -> Self {
        Self {
            station: "377".to_string(),
            history_url: HISTORY_URL.to_string(),
            forecast_url: FORECAST_URL.to_string(),
            forecast_station: "380".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://database.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Pause between two fetch windows.
    pub cooldown_ms: u64,
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: 1000,
            timeout_secs: 30,
        }
    }
}

impl FetchConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parquet_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub solaredge: SolarEdgeConfig,
    pub budget: BudgetConfig,
    pub location: LocationConfig,
    pub knmi: KnmiConfig,
    pub database: DatabaseConfig,
    pub fetch: FetchConfig,
    pub dataset: DatasetConfig,
}

impl AppConfig {
    /// Reads and validates the configuration at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        let config: AppConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.solaredge.api_key.trim().is_empty() {
            return Err(ConfigError::MissingCredential);
        }
        self.location.tz()?;
        if self.budget.soft_limit > self.budget.hard_limit {
            return Err(ConfigError::InconsistentBudget {
                soft: self.budget.soft_limit,
                hard: self.budget.hard_limit,
            });
        }
        Ok(())
    }

    /// Writes the configuration to `path`, replacing the file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents).map_err(|e| ConfigError::Write(path.to_path_buf(), e))?;
        info!("Saved configuration to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn file_with(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_minimal_file_gets_defaults() -> Result<(), ConfigError> {
        let file = file_with("[solaredge]\napi_key = \"abc\"\n");
        let config = AppConfig::load(file.path())?;

        assert_eq!(config.solaredge.api_key, "abc");
        assert_eq!(config.solaredge.site_id, None);
        assert_eq!(config.budget, BudgetConfig { soft_limit: 250, hard_limit: 275 });
        assert_eq!(config.location.tz()?, chrono_tz::Europe::Amsterdam);
        assert_eq!(config.knmi.station, "377");
        assert_eq!(config.fetch.cooldown(), Duration::from_millis(1000));
        assert_eq!(config.fetch.timeout(), Duration::from_secs(30));
        assert_eq!(config.dataset.parquet_path, None);
        Ok(())
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        let file = file_with("[location]\ntimezone = \"Europe/Amsterdam\"\n");
        assert!(matches!(
            AppConfig::load(file.path()),
            Err(ConfigError::MissingCredential)
        ));
    }

    #[test]
    fn test_invalid_timezone_and_budget_are_rejected() {
        let file = file_with("[solaredge]\napi_key = \"abc\"\n[location]\ntimezone = \"Mars/Olympus\"\n");
        assert!(matches!(
            AppConfig::load(file.path()),
            Err(ConfigError::InvalidTimezone(ref tz)) if tz == "Mars/Olympus"
        ));

        let file = file_with("[solaredge]\napi_key = \"abc\"\n[budget]\nsoft_limit = 300\nhard_limit = 275\n");
        assert!(matches!(
            AppConfig::load(file.path()),
            Err(ConfigError::InconsistentBudget { soft: 300, hard: 275 })
        ));
    }

    #[test]
    fn test_unreadable_and_malformed_files() {
        assert!(matches!(
            AppConfig::load(Path::new("/nonexistent/config.toml")),
            Err(ConfigError::Read(..))
        ));
        let file = file_with("[solaredge\napi_key = ");
        assert!(matches!(AppConfig::load(file.path()), Err(ConfigError::Parse(..))));
    }

    #[test]
    fn test_site_id_is_written_back() -> Result<(), ConfigError> {
        let file = file_with("[solaredge]\napi_key = \"abc\"\n[knmi]\nstation = \"260\"\n");
        let mut config = AppConfig::load(file.path())?;
        config.solaredge.site_id = Some(4242);
        config.save(file.path())?;

        let reloaded = AppConfig::load(file.path())?;
        assert_eq!(reloaded.solaredge.site_id, Some(4242));
        assert_eq!(reloaded.knmi.station, "260");
        assert_eq!(reloaded, config);
        Ok(())
    }
}
