//! Tables that are rebuilt wholesale rather than appended to.

use crate::store::database::Database;
use crate::store::error::StoreError;
use crate::types::records::{format_export_timestamp, AlignedRecord, ForecastRecord};
use chrono::{DateTime, Utc};
use log::info;
use sqlx::sqlite::SqlitePool;

/// The exported training dataset.
#[derive(Clone)]
pub struct DatasetTable {
    pool: SqlitePool,
}

impl DatasetTable {
    pub fn new(database: &Database) -> Self {
        Self {
            pool: database.pool().clone(),
        }
    }

    /// Replaces the table contents with `records` in one transaction.
    ///
    /// Rows are written in ascending timestamp order whatever the order of `records`.
    pub async fn replace(&self, records: &[AlignedRecord]) -> Result<u64, StoreError> {
        let mut ordered = records.to_vec();
        ordered.sort_by_key(|r| r.timestamp);

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM dataset").execute(&mut *tx).await?;
        let mut written = 0;
        for record in &ordered {
            written += sqlx::query(
                "INSERT INTO dataset (timestamp, temperatuur, duur_neerslag, bewolking, \
                 solar_altitude, solar_azimuth, energy) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )
            .bind(format_export_timestamp(&record.timestamp))
            .bind(record.temperatuur)
            .bind(record.duur_neerslag)
            .bind(record.bewolking)
            .bind(record.solar_altitude)
            .bind(record.solar_azimuth)
            .bind(record.energy)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }
        tx.commit().await?;
        info!("Replaced dataset table with {} row(s)", written);
        Ok(written)
    }

    pub async fn read_all(&self) -> Result<Vec<AlignedRecord>, StoreError> {
        let rows = sqlx::query_as::<_, (String, f64, f64, f64, f64, f64, f64)>(
            "SELECT timestamp, temperatuur, duur_neerslag, bewolking, solar_altitude, \
             solar_azimuth, energy FROM dataset ORDER BY timestamp",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(
                |(ts, temperatuur, duur_neerslag, bewolking, solar_altitude, solar_azimuth, energy)| {
                    Ok(AlignedRecord {
                        timestamp: parse_export_timestamp("dataset", &ts)?,
                        temperatuur,
                        duur_neerslag,
                        bewolking,
                        solar_altitude,
                        solar_azimuth,
                        energy,
                    })
                },
            )
            .collect()
    }
}

/// The latest weather forecast.
#[derive(Clone)]
pub struct ForecastTable {
    pool: SqlitePool,
}

impl ForecastTable {
    pub fn new(database: &Database) -> Self {
        Self {
            pool: database.pool().clone(),
        }
    }

    pub async fn replace(&self, records: &[ForecastRecord]) -> Result<u64, StoreError> {
        let mut ordered = records.to_vec();
        ordered.sort_by_key(|r| r.timestamp);

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM forecast").execute(&mut *tx).await?;
        let mut written = 0;
        for record in &ordered {
            written += sqlx::query(
                "INSERT INTO forecast (timestamp, temperatuur, neerslag, bewolking) \
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(format_export_timestamp(&record.timestamp))
            .bind(record.temperatuur)
            .bind(record.neerslag)
            .bind(record.bewolking)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }
        tx.commit().await?;
        info!("Replaced forecast table with {} row(s)", written);
        Ok(written)
    }

    pub async fn read_all(&self) -> Result<Vec<ForecastRecord>, StoreError> {
        let rows = sqlx::query_as::<_, (String, f64, f64, f64)>(
            "SELECT timestamp, temperatuur, neerslag, bewolking FROM forecast ORDER BY timestamp",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(ts, temperatuur, neerslag, bewolking)| {
                Ok(ForecastRecord {
                    timestamp: parse_export_timestamp("forecast", &ts)?,
                    temperatuur,
                    neerslag,
                    bewolking,
                })
            })
            .collect()
    }
}

fn parse_export_timestamp(table: &'static str, value: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|source| StoreError::InvalidTimestamp {
            table,
            value: value.to_string(),
            source,
        })
}
