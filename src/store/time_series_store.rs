use crate::store::database::Database;
use crate::store::error::StoreError;
use crate::types::sample::{Sample, StoredSeries, TIMESTAMP_FORMAT};
use chrono::NaiveDateTime;
use log::debug;
use sqlx::sqlite::SqlitePool;
use sqlx::{Sqlite, Transaction};

/// Append-only persisted samples of one named series.
///
/// Timestamps are the primary key: a timestamp, once written, is never updated or
/// deleted. Every `append` commits before returning.
#[derive(Clone)]
pub struct TimeSeriesStore {
    pool: SqlitePool,
    series: String,
}

impl TimeSeriesStore {
    pub fn new(database: &Database, series: impl Into<String>) -> Self {
        Self {
            pool: database.pool().clone(),
            series: series.into(),
        }
    }

    pub fn series(&self) -> &str {
        &self.series
    }

    /// The latest persisted timestamp, `None` for a series with no rows yet.
    pub async fn last_timestamp(&self) -> Result<Option<NaiveDateTime>, StoreError> {
        let last: Option<String> =
            sqlx::query_scalar("SELECT MAX(ts) FROM series_values WHERE series = ?1")
                .bind(&self.series)
                .fetch_one(&self.pool)
                .await?;
        last.as_deref().map(parse_timestamp).transpose()
    }

    /// The earliest persisted timestamp, `None` for a series with no rows yet.
    pub async fn first_timestamp(&self) -> Result<Option<NaiveDateTime>, StoreError> {
        let first: Option<String> =
            sqlx::query_scalar("SELECT MIN(ts) FROM series_values WHERE series = ?1")
                .bind(&self.series)
                .fetch_one(&self.pool)
                .await?;
        first.as_deref().map(parse_timestamp).transpose()
    }

    /// Inserts `rows` in one transaction and returns how many were inserted.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateKey`] if any timestamp already exists, in which
    /// case nothing from `rows` is kept.
    pub async fn append(&self, rows: &[Sample]) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;
        let inserted = insert_rows(&mut tx, &self.series, rows).await?;
        tx.commit().await?;
        debug!("Committed {} row(s) to series {}", inserted, self.series);
        Ok(inserted)
    }

    /// All persisted samples, ordered by timestamp.
    pub async fn read_all(&self) -> Result<StoredSeries, StoreError> {
        let rows = sqlx::query_as::<_, (String, f64)>(
            "SELECT ts, value FROM series_values WHERE series = ?1 ORDER BY ts",
        )
        .bind(&self.series)
        .fetch_all(&self.pool)
        .await?;

        let samples = rows
            .into_iter()
            .map(|(ts, value)| Ok(Sample::new(parse_timestamp(&ts)?, value)))
            .collect::<Result<Vec<_>, StoreError>>()?;
        Ok(StoredSeries::new(self.series.clone(), samples))
    }
}

/// Appends rows to several series of one source in a single transaction, so they
/// are committed (or rejected) together.
///
/// All stores must belong to the same database.
pub async fn append_together(batch: &[(&TimeSeriesStore, &[Sample])]) -> Result<u64, StoreError> {
    let Some((first, _)) = batch.first() else {
        return Ok(0);
    };
    let mut tx = first.pool.begin().await?;
    let mut inserted = 0;
    for (store, rows) in batch {
        inserted += insert_rows(&mut tx, &store.series, rows).await?;
    }
    tx.commit().await?;
    debug!(
        "Committed {} row(s) across {} series",
        inserted,
        batch.len()
    );
    Ok(inserted)
}

async fn insert_rows(
    tx: &mut Transaction<'_, Sqlite>,
    series: &str,
    rows: &[Sample],
) -> Result<u64, StoreError> {
    let mut inserted = 0;
    for row in rows {
        let result = sqlx::query("INSERT INTO series_values (series, ts, value) VALUES (?1, ?2, ?3)")
            .bind(series)
            .bind(row.timestamp.format(TIMESTAMP_FORMAT).to_string())
            .bind(row.value)
            .execute(&mut **tx)
            .await;
        match result {
            Ok(done) => inserted += done.rows_affected(),
            Err(sqlx::Error::Database(db_error)) if db_error.is_unique_violation() => {
                return Err(StoreError::DuplicateKey {
                    series: series.to_string(),
                    timestamp: row.timestamp,
                });
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(inserted)
}

fn parse_timestamp(value: &str) -> Result<NaiveDateTime, StoreError> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).map_err(|source| {
        StoreError::InvalidTimestamp {
            table: "series_values",
            value: value.to_string(),
            source,
        }
    })
}
