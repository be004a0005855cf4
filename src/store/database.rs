use crate::store::error::StoreError;
use log::info;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

/// SQLite database holding acquired series, request budgets and exported datasets.
///
/// One process owns the database at a time; the pool exists for connection reuse,
/// not for concurrent writers.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens (creating if needed) the database at `database_url` and applies migrations.
    ///
    /// # Arguments
    ///
    /// * `database_url` - `SQLite` database url (e.g., `sqlite://database.db`)
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Connect`] if the database cannot be opened and
    /// [`StoreError::Migrate`] if the schema cannot be applied.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| StoreError::Connect(database_url.to_string(), e))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Connect(database_url.to_string(), e))?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Opened database {}", database_url);

        Ok(Self { pool })
    }

    /// Creates an in-memory database.
    ///
    /// Every `SQLite` memory connection is its own database, so the pool is capped at one.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| StoreError::Connect("sqlite::memory:".to_string(), e))?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
