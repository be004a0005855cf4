use crate::store::error::StoreError;
use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use chrono_tz::Tz;
use polars::error::PolarsError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlignError {
    #[error("Bucket width must be positive, got {0}")]
    InvalidBucketWidth(TimeDelta),

    #[error("Failed to truncate {timestamp} to a bucket of {width}")]
    Truncate {
        timestamp: DateTime<Utc>,
        width: TimeDelta,
        #[source]
        source: chrono::RoundingError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalTimeIssue {
    /// The wall-clock time occurs twice, in the hour the clocks are set back.
    Ambiguous,
    /// The wall-clock time is skipped, in the hour the clocks are set forward.
    Nonexistent,
}

impl fmt::Display for LocalTimeIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalTimeIssue::Ambiguous => write!(f, "ambiguous"),
            LocalTimeIssue::Nonexistent => write!(f, "nonexistent"),
        }
    }
}

/// A local timestamp that does not map to exactly one instant.
///
/// Recoverable: the aligner drops the sample and carries on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Local time {timestamp} is {issue} in {timezone}")]
pub struct AmbiguousTimeError {
    pub timestamp: NaiveDateTime,
    pub timezone: Tz,
    pub issue: LocalTimeIssue,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("Failed to compute the sun position at {timestamp}: {message}")]
pub struct SolarPositionError {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Align(#[from] AlignError),

    #[error("Failed to assemble the dataset frame")]
    Frame(#[source] PolarsError),

    #[error("I/O error writing parquet file '{0}'")]
    ParquetWriteIo(PathBuf, #[source] std::io::Error),

    #[error("Encoding error writing parquet file '{0}'")]
    ParquetWritePolars(PathBuf, #[source] PolarsError),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error(transparent)]
    SolarPosition(#[from] SolarPositionError),

    #[error("Joined frame has no series named '{0}'")]
    MissingSeries(String),
}
