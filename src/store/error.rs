use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to open database '{0}'")]
    Connect(String, #[source] sqlx::Error),

    #[error("Failed to apply database migrations")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Database query failed")]
    Query(#[from] sqlx::Error),

    // Acquisition must make this impossible; reaching it means the planner overlapped.
    #[error("Series '{series}' already holds a value at {timestamp}")]
    DuplicateKey {
        series: String,
        timestamp: NaiveDateTime,
    },

    #[error("Stored timestamp '{value}' in {table} is not valid")]
    InvalidTimestamp {
        table: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Stored request count {0} is negative")]
    NegativeCount(i64),
}
