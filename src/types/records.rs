//! Flat output rows of the dataset and forecast builds.

use chrono::{DateTime, SecondsFormat, Utc};

/// Column names of the exported dataset table, in order.
pub const DATASET_COLUMNS: [&str; 7] = [
    "timestamp",
    "temperatuur",
    "duur_neerslag",
    "bewolking",
    "solar_altitude",
    "solar_azimuth",
    "energy",
];

/// One hourly row of the training dataset. Every field is present.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignedRecord {
    pub timestamp: DateTime<Utc>,
    /// Air temperature in degrees Celsius.
    pub temperatuur: f64,
    /// Precipitation duration within the hour, in tenths of an hour.
    pub duur_neerslag: f64,
    /// Cloud cover in octants, 9 meaning the sky was invisible.
    pub bewolking: f64,
    /// Sun altitude above the horizon in degrees.
    pub solar_altitude: f64,
    /// Sun azimuth in degrees, clockwise from north.
    pub solar_azimuth: f64,
    /// Production energy in the hour, in Wh.
    pub energy: f64,
}

/// One hourly row of the weather forecast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastRecord {
    pub timestamp: DateTime<Utc>,
    pub temperatuur: f64,
    pub neerslag: f64,
    /// Weighted cloud score in octants, see [`crate::clients::knmi::cloud_score`].
    pub bewolking: f64,
}

/// Stable text form used for exported timestamps.
pub fn format_export_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}
