use crate::acquisition::FetchSummary;
use crate::clients::monitoring::MonitoringApi;
use crate::clock::Clock;
use crate::config::error::ConfigError;
use crate::error::DatasetError;
use crate::planner::IncrementalFetchPlanner;
use crate::store::time_series_store::TimeSeriesStore;
use crate::types::sample::{resolve_all, AbsentPolicy, Sample};
use chrono::NaiveDateTime;
use log::{info, warn};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Brings the stored SolarEdge energy series up to yesterday.
pub struct ProductionJob {
    monitoring: MonitoringApi,
    store: TimeSeriesStore,
    clock: Arc<dyn Clock>,
    planner: IncrementalFetchPlanner,
    cooldown: Duration,
}

impl ProductionJob {
    pub fn new(
        monitoring: MonitoringApi,
        store: TimeSeriesStore,
        clock: Arc<dyn Clock>,
        cooldown: Duration,
    ) -> Self {
        Self {
            monitoring,
            store,
            clock,
            planner: IncrementalFetchPlanner::new(),
            cooldown,
        }
    }

    /// The only site of the API key.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MultipleSites`] when there is more than one: the operator has to
    /// pick one in the configuration.
    pub async fn discover_site(&self) -> Result<u64, DatasetError> {
        let sites = self.monitoring.sites().await?;
        match sites.as_slice() {
            [] => Err(ConfigError::NoSites.into()),
            [site] => {
                info!("Only one site found, using {}", site.id);
                Ok(site.id)
            }
            several => {
                warn!("Multiple sites found");
                Err(ConfigError::MultipleSites(several.iter().map(|s| s.id).collect()).into())
            }
        }
    }

    /// Fetches and commits every missing window, one at a time.
    pub async fn run(&self, site_id: u64) -> Result<FetchSummary, DatasetError> {
        let past_soft_before = self.monitoring.client().calls_past_soft_limit();
        let period = self.monitoring.data_period(site_id).await?;
        let latest = period.end_date.min(self.clock.yesterday());
        let last = self.store.last_timestamp().await?.map(|ts| ts.date());
        let windows = self.planner.plan(last, period.start_date, latest);

        let mut summary = FetchSummary::default();
        if windows.is_empty() {
            info!("Production data is up to date until {}", latest);
            summary.past_soft_limit = self.monitoring.client().calls_past_soft_limit() - past_soft_before;
            return Ok(summary);
        }

        for (i, window) in windows.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.cooldown).await;
            }
            let values = self.monitoring.energy(site_id, *window).await?;
            let samples: Vec<_> = resolve_all(values, AbsentPolicy::Zero)
                .into_iter()
                .filter(|sample| window.contains(sample.timestamp.date()))
                .collect();
            let (samples, repeated) = drop_repeated(samples);
            if repeated > 0 {
                warn!(
                    "Dropped {} production sample(s) with a repeated local time in {}",
                    repeated, window
                );
            }
            let inserted = self.store.append(&samples).await?;
            info!("Stored {} sample(s) of {} for {}", inserted, self.store.series(), window);

            summary.windows += 1;
            summary.rows += inserted;
            summary.repeated += repeated;
        }
        summary.past_soft_limit = self.monitoring.client().calls_past_soft_limit() - past_soft_before;
        Ok(summary)
    }
}

/// Removes every sample whose local timestamp occurs more than once.
///
/// Repeats happen in the hour the clocks are set back; which copy belongs to which
/// instant is unknown, and the aligner drops that hour as ambiguous anyway.
fn drop_repeated(samples: Vec<Sample>) -> (Vec<Sample>, usize) {
    let mut occurrences: HashMap<NaiveDateTime, usize> = HashMap::new();
    for sample in &samples {
        *occurrences.entry(sample.timestamp).or_default() += 1;
    }
    let total = samples.len();
    let kept: Vec<Sample> = samples
        .into_iter()
        .filter(|sample| occurrences.get(&sample.timestamp) == Some(&1))
        .collect();
    let dropped = total - kept.len();
    (kept, dropped)
}
