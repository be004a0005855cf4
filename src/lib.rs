//! Builds an hourly dataset of solar production and weather for training models.
//!
//! Production telemetry comes from the SolarEdge monitoring API, hourly weather
//! history and forecasts from KNMI. Every series is fetched incrementally in
//! month-bounded windows and appended to SQLite, then aligned to UTC hours, joined
//! with the sun's position and exported as the `dataset` table.

pub mod acquisition;
pub mod clients;
mod clock;
pub mod config;
pub mod dataset;
mod error;
mod pipeline;
mod planner;
pub mod store;
#[cfg(test)]
pub(crate) mod testing;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::DatasetError;
pub use pipeline::{FetchReport, Pipeline};
pub use planner::IncrementalFetchPlanner;

pub use acquisition::FetchSummary;
pub use clients::error::ClientError;
pub use clients::rate_limited_client::RateLimitedClient;
pub use clients::transport::{HttpTransport, JsonTransport};
pub use config::error::ConfigError;
pub use config::AppConfig;
pub use dataset::aligner::{combine_date_hour, Aggregation, AlignedSeries, HourlyAligner};
pub use dataset::builder::{BuildReport, DatasetBuilder};
pub use dataset::error::{AlignError, AmbiguousTimeError, ExportError, SolarPositionError};
pub use dataset::joiner::{DerivedFeature, JoinedFrame, SeriesJoiner};
pub use dataset::solar::{SolarGeometryFeature, SolarPosition, SpaSolarPosition, SunPosition};
pub use store::error::StoreError;
pub use store::time_series_store::TimeSeriesStore;

pub use types::fetch_window::FetchWindow;
pub use types::month::Month;
pub use types::records::{AlignedRecord, ForecastRecord};
pub use types::request_budget::{RequestBudget, RequestLimits};
pub use types::sample::{Sample, StoredSeries, TimeSeries, TimestampedValue};
