use crate::clients::error::ClientError;
use crate::config::error::ConfigError;
use crate::dataset::error::{AlignError, ExportError};
use crate::store::error::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Align(#[from] AlignError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

impl DatasetError {
    /// Process exit code for this error, distinct per category.
    pub fn exit_code(&self) -> u8 {
        match self {
            DatasetError::Config(_) => 2,
            DatasetError::Client(ClientError::RateLimitExceeded { .. }) => 3,
            DatasetError::Client(ClientError::Budget(_)) => 6,
            DatasetError::Client(_) => 4,
            DatasetError::Store(StoreError::DuplicateKey { .. })
            | DatasetError::Export(ExportError::Store(StoreError::DuplicateKey { .. })) => 5,
            DatasetError::Store(_) | DatasetError::Export(ExportError::Store(_)) => 6,
            DatasetError::Align(_) | DatasetError::Export(_) => 7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_exit_codes_are_distinct_per_category() {
        let day = NaiveDate::from_ymd_opt(2019, 10, 1).unwrap();
        let errors = [
            DatasetError::from(ConfigError::MissingCredential),
            DatasetError::from(ClientError::RateLimitExceeded {
                day,
                count: 275,
                limit: 275,
            }),
            DatasetError::from(ClientError::UnexpectedPayload {
                url: "https://example.test".to_string(),
                message: "empty".to_string(),
            }),
            DatasetError::from(StoreError::DuplicateKey {
                series: "solaredge_energy".to_string(),
                timestamp: day.and_hms_opt(0, 0, 0).unwrap(),
            }),
            DatasetError::from(StoreError::NegativeCount(-1)),
            DatasetError::from(ExportError::MissingSeries("T".to_string())),
        ];
        let codes: Vec<u8> = errors.iter().map(DatasetError::exit_code).collect();
        assert_eq!(codes, vec![2, 3, 4, 5, 6, 7]);
    }
}
