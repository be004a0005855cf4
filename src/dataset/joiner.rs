//! Inner join of aligned series on their shared timestamps.

use crate::dataset::error::ExportError;
use crate::types::records::AlignedRecord;
use crate::types::sample::TimeSeries;
use chrono::{DateTime, Utc};
use log::debug;

/// Joined column name to exported field name. Total and fixed.
pub const FIELD_RENAMES: [(&str, &str); 6] = [
    ("T", "temperatuur"),
    ("DR", "duur_neerslag"),
    ("N", "bewolking"),
    ("alt", "solar_altitude"),
    ("azi", "solar_azimuth"),
    ("energy", "energy"),
];

/// Columns computed from the timestamp alone, after the join.
pub trait DerivedFeature {
    fn names(&self) -> &'static [&'static str];

    /// One value per name, in the same order.
    fn compute(&self, at: DateTime<Utc>) -> Result<Vec<f64>, ExportError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRow {
    pub timestamp: DateTime<Utc>,
    pub values: Vec<f64>,
}

/// Result of a join: named columns, rows ascending by timestamp.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JoinedFrame {
    columns: Vec<String>,
    rows: Vec<JoinedRow>,
}

impl JoinedFrame {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[JoinedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn timestamps(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        self.rows.iter().map(|row| row.timestamp)
    }

    fn column_index(&self, name: &str) -> Result<usize, ExportError> {
        self.columns
            .iter()
            .position(|column| column == name)
            .ok_or_else(|| ExportError::MissingSeries(name.to_string()))
    }

    /// Projects the joined columns onto dataset records, see [`FIELD_RENAMES`].
    pub fn to_records(&self) -> Result<Vec<AlignedRecord>, ExportError> {
        let [t, dr, n, alt, azi, energy] = FIELD_RENAMES.map(|(source, _)| self.column_index(source));
        let (t, dr, n, alt, azi, energy) = (t?, dr?, n?, alt?, azi?, energy?);

        Ok(self
            .rows
            .iter()
            .map(|row| AlignedRecord {
                timestamp: row.timestamp,
                temperatuur: row.values[t],
                duur_neerslag: row.values[dr],
                bewolking: row.values[n],
                solar_altitude: row.values[alt],
                solar_azimuth: row.values[azi],
                energy: row.values[energy],
            })
            .collect())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SeriesJoiner;

impl SeriesJoiner {
    /// Keeps only the timestamps present in every series; there is no fill or
    /// interpolation. `derived` is evaluated for the surviving timestamps only and
    /// its columns come after the series columns.
    pub fn join(
        &self,
        series: &[(&str, &TimeSeries)],
        derived: Option<&dyn DerivedFeature>,
    ) -> Result<JoinedFrame, ExportError> {
        let mut columns: Vec<String> = series.iter().map(|(name, _)| name.to_string()).collect();
        if let Some(feature) = derived {
            columns.extend(feature.names().iter().map(|name| name.to_string()));
        }

        let Some((_, driver)) = series.iter().min_by_key(|(_, s)| s.len()) else {
            return Ok(JoinedFrame { columns, rows: Vec::new() });
        };

        let mut rows = Vec::new();
        for timestamp in driver.timestamps() {
            let Some(mut values) = series
                .iter()
                .map(|(_, s)| s.get(&timestamp))
                .collect::<Option<Vec<f64>>>()
            else {
                continue;
            };
            if let Some(feature) = derived {
                values.extend(feature.compute(timestamp)?);
            }
            rows.push(JoinedRow { timestamp, values });
        }

        debug!(
            "Joined {} series into {} row(s) from {} candidate timestamp(s)",
            series.len(),
            rows.len(),
            driver.len()
        );
        Ok(JoinedFrame { columns, rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::cell::Cell;

    fn t(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2019, 6, 21, h, 0, 0).unwrap()
    }

    struct CountingFeature {
        calls: Cell<usize>,
    }

    impl DerivedFeature for CountingFeature {
        fn names(&self) -> &'static [&'static str] {
            &["alt", "azi"]
        }

        fn compute(&self, at: DateTime<Utc>) -> Result<Vec<f64>, ExportError> {
            self.calls.set(self.calls.get() + 1);
            let hours = (at - t(0)).num_hours() as f64;
            Ok(vec![hours, hours * 10.0])
        }
    }

    #[test]
    fn test_inner_join_drops_partial_timestamps() -> Result<(), ExportError> {
        let a: TimeSeries = [(t(1), 1.0), (t(2), 2.0), (t(3), 3.0)].into_iter().collect();
        let b: TimeSeries = [(t(1), 10.0), (t(3), 30.0)].into_iter().collect();
        let frame = SeriesJoiner.join(&[("A", &a), ("B", &b)], None)?;

        assert_eq!(frame.columns(), &["A".to_string(), "B".to_string()]);
        assert_eq!(frame.timestamps().collect::<Vec<_>>(), vec![t(1), t(3)]);
        assert_eq!(frame.rows()[1].values, vec![3.0, 30.0]);
        Ok(())
    }

    #[test]
    fn test_derived_feature_runs_only_for_surviving_rows() -> Result<(), ExportError> {
        let a: TimeSeries = (0..24).map(|h| (t(0) + Duration::hours(h), 1.0)).collect();
        let b: TimeSeries = [(t(5), 2.0), (t(7), 2.0)].into_iter().collect();
        let feature = CountingFeature { calls: Cell::new(0) };
        let frame = SeriesJoiner.join(&[("A", &a), ("B", &b)], Some(&feature))?;

        assert_eq!(feature.calls.get(), 2);
        assert_eq!(frame.columns().len(), 4);
        assert_eq!(frame.rows()[0].values, vec![1.0, 2.0, 5.0, 50.0]);
        Ok(())
    }

    struct FailingFeature;

    impl DerivedFeature for FailingFeature {
        fn names(&self) -> &'static [&'static str] {
            &["alt", "azi"]
        }

        fn compute(&self, at: DateTime<Utc>) -> Result<Vec<f64>, ExportError> {
            Err(ExportError::SolarPosition(crate::dataset::error::SolarPositionError {
                timestamp: at,
                message: "out of range".to_string(),
            }))
        }
    }

    #[test]
    fn test_derived_feature_failure_aborts_join() {
        let a: TimeSeries = [(t(1), 1.0)].into_iter().collect();
        let result = SeriesJoiner.join(&[("A", &a)], Some(&FailingFeature));
        assert!(matches!(result, Err(ExportError::SolarPosition(_))));
    }

    #[test]
    fn test_no_series_gives_empty_frame() -> Result<(), ExportError> {
        let frame = SeriesJoiner.join(&[], None)?;
        assert!(frame.is_empty());
        Ok(())
    }

    #[test]
    fn test_projection_renames_fields() -> Result<(), ExportError> {
        let one = |v: f64| -> TimeSeries { [(t(12), v)].into_iter().collect() };
        let (temperature, duration, clouds, energy) = (one(21.5), one(0.0), one(4.0), one(812.0));
        let feature = CountingFeature { calls: Cell::new(0) };
        let frame = SeriesJoiner.join(
            &[("energy", &energy), ("T", &temperature), ("DR", &duration), ("N", &clouds)],
            Some(&feature),
        )?;

        let records = frame.to_records()?;
        assert_eq!(
            records,
            vec![AlignedRecord {
                timestamp: t(12),
                temperatuur: 21.5,
                duur_neerslag: 0.0,
                bewolking: 4.0,
                solar_altitude: 12.0,
                solar_azimuth: 120.0,
                energy: 812.0,
            }]
        );
        Ok(())
    }

    #[test]
    fn test_projection_requires_every_field() -> Result<(), ExportError> {
        let energy: TimeSeries = [(t(1), 1.0)].into_iter().collect();
        let frame = SeriesJoiner.join(&[("energy", &energy)], None)?;
        assert!(matches!(frame.to_records(), Err(ExportError::MissingSeries(ref name)) if name == "T"));
        Ok(())
    }
}
