//! Wires configuration, database and provider clients into the acquisition and
//! dataset runs.

use crate::acquisition::forecast::ForecastJob;
use crate::acquisition::production::ProductionJob;
use crate::acquisition::weather_history::WeatherHistoryJob;
use crate::acquisition::{FetchSummary, CLOUD_SERIES, ENERGY_SERIES, PRECIPITATION_SERIES, TEMPERATURE_SERIES};
use crate::clients::knmi::{KnmiForecastClient, KnmiHistoryClient};
use crate::clients::monitoring::MonitoringApi;
use crate::clients::rate_limited_client::RateLimitedClient;
use crate::clients::transport::{HttpTransport, JsonTransport};
use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::dataset::builder::{BuildReport, DatasetBuilder};
use crate::error::DatasetError;
use crate::store::budget_store::BudgetStore;
use crate::store::database::Database;
use crate::store::export::ForecastTable;
use crate::store::time_series_store::TimeSeriesStore;
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FetchReport {
    pub production: FetchSummary,
    pub weather: FetchSummary,
}

pub struct Pipeline {
    config: AppConfig,
    config_path: PathBuf,
    database: Database,
    transport: Arc<dyn JsonTransport>,
    clock: Arc<dyn Clock>,
}

impl Pipeline {
    /// Opens the configured database and sets up HTTP and the system clock.
    pub async fn open(config: AppConfig, config_path: PathBuf) -> Result<Self, DatasetError> {
        config.validate()?;
        let timezone = config.location.tz()?;
        let transport = Arc::new(HttpTransport::new(config.fetch.timeout())?);
        let database = Database::connect(&config.database.url).await?;
        Ok(Self::with_parts(
            config,
            config_path,
            database,
            transport,
            Arc::new(SystemClock::new(timezone)),
        ))
    }

    pub fn with_parts(
        config: AppConfig,
        config_path: PathBuf,
        database: Database,
        transport: Arc<dyn JsonTransport>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            config_path,
            database,
            transport,
            clock,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    fn store(&self, series: &str) -> TimeSeriesStore {
        TimeSeriesStore::new(&self.database, series)
    }

    /// Brings production and weather history up to date.
    ///
    /// A site id discovered on the way is written back to the configuration file.
    pub async fn fetch(&mut self) -> Result<FetchReport, DatasetError> {
        let client = RateLimitedClient::builder()
            .transport(self.transport.clone())
            .budget(BudgetStore::new(&self.database))
            .clock(self.clock.clone())
            .api_key(self.config.solaredge.api_key.clone())
            .base_url(self.config.solaredge.base_url.clone())
            .soft_limit(self.config.budget.soft_limit)
            .hard_limit(self.config.budget.hard_limit)
            .build();
        let production = ProductionJob::new(
            MonitoringApi::new(client),
            self.store(ENERGY_SERIES),
            self.clock.clone(),
            self.config.fetch.cooldown(),
        );

        let site_id = match self.config.solaredge.site_id {
            Some(id) => id,
            None => {
                let id = production.discover_site().await?;
                self.config.solaredge.site_id = Some(id);
                self.config.save(&self.config_path)?;
                id
            }
        };
        let production = production.run(site_id).await?;

        let weather = WeatherHistoryJob::new(
            KnmiHistoryClient::new(
                self.transport.clone(),
                self.config.knmi.history_url.clone(),
                self.config.knmi.station.clone(),
            ),
            self.store(ENERGY_SERIES),
            self.store(TEMPERATURE_SERIES),
            self.store(PRECIPITATION_SERIES),
            self.store(CLOUD_SERIES),
            self.config.fetch.cooldown(),
        )
        .run()
        .await?;

        info!(
            "Fetched {} production and {} weather window(s)",
            production.windows, weather.windows
        );
        if production.past_soft_limit > 0 {
            warn!(
                "{} monitoring API request(s) went past the soft limit of {}",
                production.past_soft_limit, self.config.budget.soft_limit
            );
        }
        Ok(FetchReport { production, weather })
    }

    pub async fn forecast(&self) -> Result<usize, DatasetError> {
        ForecastJob::new(
            KnmiForecastClient::new(
                self.transport.clone(),
                self.config.knmi.forecast_url.clone(),
                self.config.knmi.forecast_station.clone(),
            ),
            ForecastTable::new(&self.database),
        )
        .run()
        .await
    }

    pub async fn build(&self) -> Result<BuildReport, DatasetError> {
        let report = DatasetBuilder::builder()
            .database(&self.database)
            .timezone(self.config.location.tz()?)
            .latitude(self.config.location.latitude)
            .longitude(self.config.location.longitude)
            .maybe_parquet_path(self.config.dataset.parquet_path.clone())
            .build()
            .build()
            .await?;
        Ok(report)
    }

    /// Fetch, refresh the forecast, then build.
    pub async fn run(&mut self) -> Result<BuildReport, DatasetError> {
        self.fetch().await?;
        self.forecast().await?;
        self.build().await
    }
}
