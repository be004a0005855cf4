use crate::dataset::error::ExportError;
use crate::types::records::{format_export_timestamp, AlignedRecord};
use log::info;
use polars::prelude::*;
use std::path::Path;
use tokio::task;

/// Lays the records out as a frame with the dataset table's columns.
pub fn records_frame(records: &[AlignedRecord]) -> Result<DataFrame, ExportError> {
    df!(
        "timestamp" => records.iter().map(|r| format_export_timestamp(&r.timestamp)).collect::<Vec<_>>(),
        "temperatuur" => records.iter().map(|r| r.temperatuur).collect::<Vec<_>>(),
        "duur_neerslag" => records.iter().map(|r| r.duur_neerslag).collect::<Vec<_>>(),
        "bewolking" => records.iter().map(|r| r.bewolking).collect::<Vec<_>>(),
        "solar_altitude" => records.iter().map(|r| r.solar_altitude).collect::<Vec<_>>(),
        "solar_azimuth" => records.iter().map(|r| r.solar_azimuth).collect::<Vec<_>>(),
        "energy" => records.iter().map(|r| r.energy).collect::<Vec<_>>(),
    )
    .map_err(ExportError::Frame)
}

/// Writes the records to a Snappy-compressed parquet file, replacing it if present.
pub async fn write_parquet(records: &[AlignedRecord], path: &Path) -> Result<(), ExportError> {
    let mut df = records_frame(records)?;
    let path_buf = path.to_path_buf();
    let rows = df.height();
    task::spawn_blocking(move || {
        let file = std::fs::File::create(&path_buf)
            .map_err(|e| ExportError::ParquetWriteIo(path_buf.clone(), e))?;
        ParquetWriter::new(file)
            .with_compression(ParquetCompression::Snappy)
            .finish(&mut df)
            .map_err(|e| ExportError::ParquetWritePolars(path_buf.clone(), e))?;
        info!("Wrote {} row(s) to {:?}", rows, path_buf);
        Ok(())
    })
    .await?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::records::DATASET_COLUMNS;
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    fn record(hour: u32) -> AlignedRecord {
        AlignedRecord {
            timestamp: Utc.with_ymd_and_hms(2019, 6, 21, hour, 0, 0).unwrap(),
            temperatuur: 20.0,
            duur_neerslag: 0.0,
            bewolking: 2.0,
            solar_altitude: 45.0,
            solar_azimuth: 135.0,
            energy: 500.0 + f64::from(hour),
        }
    }

    #[test]
    fn test_frame_has_dataset_columns() -> Result<(), ExportError> {
        let df = records_frame(&[record(8), record(9)])?;
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), DATASET_COLUMNS.len());
        for column in DATASET_COLUMNS {
            assert!(df.column(column).is_ok(), "missing {}", column);
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_parquet_file_reads_back() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("dataset.parquet");
        write_parquet(&[record(10), record(11), record(12)], &path).await?;

        let df = ParquetReader::new(std::fs::File::open(&path)?).finish()?;
        assert_eq!(df.height(), 3);
        let energy: Vec<Option<f64>> = df
            .column("energy")?
            .as_materialized_series()
            .f64()?
            .into_iter().collect();
        assert_eq!(energy, vec![Some(510.0), Some(511.0), Some(512.0)]);
        Ok(())
    }
}
