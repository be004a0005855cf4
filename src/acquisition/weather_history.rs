use crate::acquisition::FetchSummary;
use crate::clients::knmi::{HourlyObservation, KnmiHistoryClient};
use crate::dataset::aligner::combine_date_hour;
use crate::error::DatasetError;
use crate::planner::IncrementalFetchPlanner;
use crate::store::time_series_store::{append_together, TimeSeriesStore};
use crate::types::fetch_window::FetchWindow;
use crate::types::sample::{resolve_all, AbsentPolicy, Sample, TimestampedValue};
use chrono::{NaiveDate, TimeDelta};
use log::{info, warn};
use std::time::Duration;

/// The three weather series of one batch of observations, cleaned and ready to store.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WeatherBatch {
    pub temperature: Vec<Sample>,
    pub precipitation: Vec<Sample>,
    pub clouds: Vec<Sample>,
}

impl WeatherBatch {
    /// Combines date and hour into a UTC timestamp, scales temperature from tenths of a
    /// degree and drops absent values. Observations outside `window` are ignored.
    pub fn from_observations(observations: Vec<HourlyObservation>, window: FetchWindow) -> Self {
        let mut temperature = Vec::new();
        let mut precipitation = Vec::new();
        let mut clouds = Vec::new();
        for observation in observations {
            if !window.contains(observation.date) {
                continue;
            }
            let Some(timestamp) = combine_date_hour(observation.date, observation.hour) else {
                warn!(
                    "Skipping observation with hour {} on {}",
                    observation.hour, observation.date
                );
                continue;
            };
            temperature.push(TimestampedValue::new(
                timestamp,
                observation.temperature.map(|t| t / 10.0),
            ));
            precipitation.push(TimestampedValue::new(timestamp, observation.precipitation_duration));
            clouds.push(TimestampedValue::new(timestamp, observation.cloud_cover));
        }
        Self {
            temperature: resolve_all(temperature, AbsentPolicy::Drop),
            precipitation: resolve_all(precipitation, AbsentPolicy::Drop),
            clouds: resolve_all(clouds, AbsentPolicy::Drop),
        }
    }
}

/// Brings the KNMI series up to the last day of stored production.
///
/// Weather is only needed where there is production, so the production series decides
/// the range: from its first day to its last.
pub struct WeatherHistoryJob {
    knmi: KnmiHistoryClient,
    production: TimeSeriesStore,
    temperature: TimeSeriesStore,
    precipitation: TimeSeriesStore,
    clouds: TimeSeriesStore,
    planner: IncrementalFetchPlanner,
    cooldown: Duration,
}

impl WeatherHistoryJob {
    pub fn new(
        knmi: KnmiHistoryClient,
        production: TimeSeriesStore,
        temperature: TimeSeriesStore,
        precipitation: TimeSeriesStore,
        clouds: TimeSeriesStore,
        cooldown: Duration,
    ) -> Self {
        Self {
            knmi,
            production,
            temperature,
            precipitation,
            clouds,
            planner: IncrementalFetchPlanner::new(),
            cooldown,
        }
    }

    /// Last day whose observations were committed.
    ///
    /// Hour 24 is stored as midnight of the next day, so the day is taken one hour
    /// before the latest timestamp of any of the three series.
    async fn last_fetched_date(&self) -> Result<Option<NaiveDate>, DatasetError> {
        let mut last = None;
        for store in [&self.temperature, &self.precipitation, &self.clouds] {
            last = last.max(store.last_timestamp().await?);
        }
        Ok(last
            .and_then(|ts| ts.checked_sub_signed(TimeDelta::hours(1)))
            .map(|ts| ts.date()))
    }

    pub async fn run(&self) -> Result<FetchSummary, DatasetError> {
        let mut summary = FetchSummary::default();
        let (Some(first), Some(last)) = (
            self.production.first_timestamp().await?,
            self.production.last_timestamp().await?,
        ) else {
            info!("No production data stored yet, skipping weather history");
            return Ok(summary);
        };

        let fetched = self.last_fetched_date().await?;
        let windows = self.planner.plan(fetched, first.date(), last.date());
        if windows.is_empty() {
            info!("Weather history is up to date until {}", last.date());
            return Ok(summary);
        }

        for (i, window) in windows.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.cooldown).await;
            }
            let observations = self.knmi.hourly(*window).await?;
            let batch = WeatherBatch::from_observations(observations, *window);
            let inserted = append_together(&[
                (&self.temperature, &batch.temperature[..]),
                (&self.precipitation, &batch.precipitation[..]),
                (&self.clouds, &batch.clouds[..]),
            ])
            .await?;
            info!("Stored {} weather value(s) for {}", inserted, window);

            summary.windows += 1;
            summary.rows += inserted;
        }
        Ok(summary)
    }
}
