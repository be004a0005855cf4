//! Reads the acquired series, aligns and joins them, and replaces the exported dataset.

use crate::acquisition::{CLOUD_SERIES, ENERGY_SERIES, PRECIPITATION_SERIES, TEMPERATURE_SERIES};
use crate::dataset::aligner::{Aggregation, HourlyAligner};
use crate::dataset::error::ExportError;
use crate::dataset::joiner::SeriesJoiner;
use crate::dataset::parquet::write_parquet;
use crate::dataset::solar::{SolarGeometryFeature, SpaSolarPosition};
use crate::store::database::Database;
use crate::store::export::DatasetTable;
use crate::store::time_series_store::TimeSeriesStore;
use bon::bon;
use chrono_tz::Tz;
use log::info;
use std::path::PathBuf;

/// Outcome of one dataset build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildReport {
    pub rows: usize,
    /// Production samples dropped for a local time that is ambiguous or skipped.
    pub dropped: usize,
}

pub struct DatasetBuilder {
    energy: TimeSeriesStore,
    temperature: TimeSeriesStore,
    precipitation: TimeSeriesStore,
    clouds: TimeSeriesStore,
    table: DatasetTable,
    aligner: HourlyAligner,
    timezone: Tz,
    solar: SolarGeometryFeature<SpaSolarPosition>,
    parquet_path: Option<PathBuf>,
}

#[bon]
impl DatasetBuilder {
    /// # Arguments
    ///
    /// * `timezone` - Zone of the production series' wall-clock timestamps.
    /// * `latitude`, `longitude` - Location used for the solar geometry columns.
    /// * `parquet_path` - Optional. Also write the dataset to this file.
    #[builder]
    pub fn new(
        database: &Database,
        timezone: Tz,
        latitude: f64,
        longitude: f64,
        parquet_path: Option<PathBuf>,
    ) -> Self {
        Self {
            energy: TimeSeriesStore::new(database, ENERGY_SERIES),
            temperature: TimeSeriesStore::new(database, TEMPERATURE_SERIES),
            precipitation: TimeSeriesStore::new(database, PRECIPITATION_SERIES),
            clouds: TimeSeriesStore::new(database, CLOUD_SERIES),
            table: DatasetTable::new(database),
            aligner: HourlyAligner::default(),
            timezone,
            solar: SolarGeometryFeature::new(SpaSolarPosition::default(), latitude, longitude),
            parquet_path,
        }
    }

    /// Recomputes the whole dataset from the stored series.
    pub async fn build(&self) -> Result<BuildReport, ExportError> {
        let energy = self
            .aligner
            .align(&self.energy.read_all().await?, Aggregation::Sum, self.timezone)?;
        // Weather was combined and scaled at acquisition time and is stored in UTC.
        let temperature = self
            .aligner
            .align(&self.temperature.read_all().await?, Aggregation::LastValue, chrono_tz::UTC)?;
        let precipitation = self
            .aligner
            .align(&self.precipitation.read_all().await?, Aggregation::LastValue, chrono_tz::UTC)?;
        let clouds = self
            .aligner
            .align(&self.clouds.read_all().await?, Aggregation::LastValue, chrono_tz::UTC)?;

        let frame = SeriesJoiner.join(
            &[
                ("T", &temperature.series),
                ("DR", &precipitation.series),
                ("N", &clouds.series),
                ("energy", &energy.series),
            ],
            Some(&self.solar),
        )?;
        let records = frame.to_records()?;

        self.table.replace(&records).await?;
        if let Some(path) = &self.parquet_path {
            write_parquet(&records, path).await?;
        }

        info!(
            "Built dataset with {} row(s) from {} hourly energy bucket(s)",
            records.len(),
            energy.series.len()
        );
        Ok(BuildReport {
            rows: records.len(),
            dropped: energy.dropped.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::sample::Sample;
    use chrono::{NaiveDate, NaiveDateTime, TimeZone, Utc};
    use chrono_tz::Europe::Amsterdam;
    use tempfile::tempdir;

    fn naive(d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2019, 6, d)
            .and_then(|date| date.and_hms_opt(h, min, 0))
            .unwrap()
    }

    async fn seed(db: &Database) -> Result<(), ExportError> {
        TimeSeriesStore::new(db, ENERGY_SERIES)
            .append(&[
                // 14:xx CEST is the 12:00 UTC bucket.
                Sample::new(naive(21, 14, 0), 100.0),
                Sample::new(naive(21, 14, 15), 110.0),
                Sample::new(naive(21, 14, 30), 120.0),
                Sample::new(naive(21, 14, 45), 130.0),
                Sample::new(naive(21, 16, 0), 90.0),
            ])
            .await?;
        for (series, value) in [(TEMPERATURE_SERIES, 21.5), (PRECIPITATION_SERIES, 0.0), (CLOUD_SERIES, 3.0)] {
            TimeSeriesStore::new(db, series)
                .append(&[Sample::new(naive(21, 12, 0), value), Sample::new(naive(21, 13, 0), value)])
                .await?;
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_build_exports_only_complete_hours() -> Result<(), ExportError> {
        let db = Database::in_memory().await?;
        seed(&db).await?;
        let builder = DatasetBuilder::builder()
            .database(&db)
            .timezone(Amsterdam)
            .latitude(51.2)
            .longitude(6.0)
            .build();

        let report = builder.build().await?;
        assert_eq!(report, BuildReport { rows: 1, dropped: 0 });

        let rows = DatasetTable::new(&db).read_all().await?;
        assert_eq!(rows.len(), 1);
        let row = rows[0];
        assert_eq!(row.timestamp, Utc.with_ymd_and_hms(2019, 6, 21, 12, 0, 0).unwrap());
        assert_eq!(row.energy, 460.0);
        assert_eq!(row.temperatuur, 21.5);
        assert_eq!(row.bewolking, 3.0);
        assert!(row.solar_altitude > 50.0 && row.solar_altitude < 63.0);
        assert!(row.solar_azimuth > 180.0 && row.solar_azimuth < 240.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_build_writes_parquet_copy() -> Result<(), Box<dyn std::error::Error>> {
        let db = Database::in_memory().await?;
        seed(&db).await?;
        let dir = tempdir()?;
        let path = dir.path().join("dataset.parquet");
        DatasetBuilder::builder()
            .database(&db)
            .timezone(Amsterdam)
            .latitude(51.2)
            .longitude(6.0)
            .parquet_path(path.clone())
            .build()
            .build()
            .await?;
        assert!(path.exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_build_of_empty_store_clears_dataset() -> Result<(), ExportError> {
        let db = Database::in_memory().await?;
        let builder = DatasetBuilder::builder()
            .database(&db)
            .timezone(Amsterdam)
            .latitude(51.2)
            .longitude(6.0)
            .build();
        assert_eq!(builder.build().await?.rows, 0);
        assert!(DatasetTable::new(&db).read_all().await?.is_empty());
        Ok(())
    }
}
