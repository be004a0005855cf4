//! Incremental fetch loops, one per provider series.

pub mod forecast;
pub mod production;
pub mod weather_history;

/// Quarter-hour SolarEdge energy in Wh, site-local wall-clock timestamps.
pub const ENERGY_SERIES: &str = "solaredge_energy";
/// KNMI temperature in degrees Celsius, UTC.
pub const TEMPERATURE_SERIES: &str = "knmi_temperature";
/// KNMI precipitation duration in tenths of an hour, UTC.
pub const PRECIPITATION_SERIES: &str = "knmi_precipitation_duration";
/// KNMI cloud cover in octants, UTC.
pub const CLOUD_SERIES: &str = "knmi_cloud_cover";

/// What one acquisition run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FetchSummary {
    pub windows: usize,
    pub rows: u64,
    /// Budgeted requests sent past the soft limit.
    pub past_soft_limit: u32,
    /// Samples dropped because their local timestamp repeated within a window.
    pub repeated: usize,
}
