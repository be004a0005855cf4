//! KNMI hourly weather history and iPluim forecast endpoints.
//!
//! Neither endpoint needs a key and neither counts against the monitoring budget.
//! A non-success status is fatal, like for every other provider.

use crate::clients::error::ClientError;
use crate::clients::transport::JsonTransport;
use crate::clients::{date_prefix, decode};
use crate::types::fetch_window::FetchWindow;
use crate::types::sample::TimeSeries;
use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, info};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

pub const HISTORY_URL: &str = "https://www.daggegevens.knmi.nl/klimatologie/uurgegevens";
pub const FORECAST_URL: &str =
    "https://cdn.knmi.nl/knmi/json/page/weer/waarschuwingen_verwachtingen/ensemble/iPluim";

const HIGH_RESOLUTION: &str = "Hoge resolutie";

/// iPluim element codes.
const TEMPERATURE_ELEMENT: &str = "99999";
const PRECIPITATION_ELEMENT: &str = "13021";
const CLOUD_ELEMENT: &str = "20010";

/// Cloud categories of the cloud element and their weight in octants.
const CLOUD_CATEGORIES: [(&str, f64); 5] = [
    ("Onbewolkt", 0.0),
    ("Licht bewolkt", 2.0),
    ("Half bewolkt", 4.0),
    ("Zwaar bewolkt", 6.0),
    ("Geheel bewolkt", 8.0),
];

/// One hour of observations as KNMI reports it.
///
/// `hour` runs from 1 to 24 and names the end of the observed hour, so hour 24 of a
/// day is midnight of the next one. Absent fields are `None`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HourlyObservation {
    #[serde(deserialize_with = "date_prefix")]
    pub date: NaiveDate,
    pub hour: u32,
    /// Temperature in tenths of a degree Celsius.
    #[serde(rename = "T", default)]
    pub temperature: Option<f64>,
    /// Precipitation duration in tenths of an hour.
    #[serde(rename = "DR", default)]
    pub precipitation_duration: Option<f64>,
    /// Cloud cover in octants.
    #[serde(rename = "N", default)]
    pub cloud_cover: Option<f64>,
}

pub struct KnmiHistoryClient {
    transport: Arc<dyn JsonTransport>,
    url: String,
    station: String,
}

impl KnmiHistoryClient {
    pub fn new(transport: Arc<dyn JsonTransport>, url: impl Into<String>, station: impl Into<String>) -> Self {
        Self {
            transport,
            url: url.into(),
            station: station.into(),
        }
    }

    /// All hourly observations of the station for the days of `window`.
    pub async fn hourly(&self, window: FetchWindow) -> Result<Vec<HourlyObservation>, ClientError> {
        let query = vec![
            ("start".to_string(), window.start.format("%Y%m%d").to_string()),
            ("end".to_string(), window.end.format("%Y%m%d").to_string()),
            ("vars".to_string(), "ALL".to_string()),
            ("stns".to_string(), self.station.clone()),
            ("fmt".to_string(), "json".to_string()),
        ];
        let body = self.transport.get_json(&self.url, &query).await?;
        let observations: Vec<HourlyObservation> = decode(&self.url, body)?;
        debug!(
            "Received {} hourly observation(s) for station {} in {}",
            observations.len(),
            self.station,
            window
        );
        Ok(observations)
    }
}

#[derive(Debug, Deserialize)]
struct ForecastDocument {
    #[serde(default)]
    series: Vec<ForecastSeries>,
}

#[derive(Debug, Deserialize)]
struct ForecastSeries {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    data: Vec<(i64, Option<f64>)>,
}

pub struct KnmiForecastClient {
    transport: Arc<dyn JsonTransport>,
    base_url: String,
    station: String,
}

impl KnmiForecastClient {
    pub fn new(
        transport: Arc<dyn JsonTransport>,
        base_url: impl Into<String>,
        station: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            station: station.into(),
        }
    }

    /// Forecast temperature in degrees Celsius.
    pub async fn temperature(&self) -> Result<TimeSeries, ClientError> {
        let url = self.element_url(TEMPERATURE_ELEMENT);
        let document = self.fetch(&url).await?;
        named_series(&url, &document, HIGH_RESOLUTION)
    }

    /// Forecast precipitation.
    pub async fn precipitation(&self) -> Result<TimeSeries, ClientError> {
        let url = self.element_url(PRECIPITATION_ELEMENT);
        let document = self.fetch(&url).await?;
        named_series(&url, &document, HIGH_RESOLUTION)
    }

    /// Weighted cloud score, see [`cloud_score`]. Only instants all five categories
    /// report are kept.
    pub async fn cloud_cover(&self) -> Result<TimeSeries, ClientError> {
        let url = self.element_url(CLOUD_ELEMENT);
        let document = self.fetch(&url).await?;

        let mut categories = Vec::with_capacity(CLOUD_CATEGORIES.len());
        for (name, _) in CLOUD_CATEGORIES {
            categories.push(named_series(&url, &document, name)?);
        }

        let Some((first, rest)) = categories.split_first() else {
            return Ok(TimeSeries::new());
        };
        let scores = first
            .iter()
            .filter_map(|(ts, clear)| {
                let mut shares = [clear, 0.0, 0.0, 0.0, 0.0];
                for (slot, category) in shares.iter_mut().skip(1).zip(rest) {
                    *slot = category.get(&ts)?;
                }
                Some((ts, cloud_score(shares)))
            })
            .collect();
        Ok(scores)
    }

    fn element_url(&self, element: &str) -> String {
        format!("{}/{}_Expert_{}.json", self.base_url, self.station, element)
    }

    async fn fetch(&self, url: &str) -> Result<ForecastDocument, ClientError> {
        info!("Fetching forecast {}", url);
        let body: Value = self.transport.get_json(url, &[]).await?;
        decode(url, body)
    }
}

/// Combines the percentage of members forecasting each cloud category, ordered from
/// clear to overcast, into an expected cloud cover in octants.
pub fn cloud_score(shares: [f64; 5]) -> f64 {
    shares
        .iter()
        .zip(CLOUD_CATEGORIES)
        .map(|(share, (_, weight))| share * weight)
        .sum::<f64>()
        / 100.0
}

fn named_series(url: &str, document: &ForecastDocument, name: &str) -> Result<TimeSeries, ClientError> {
    let series = document
        .series
        .iter()
        .find(|s| s.name.as_deref() == Some(name))
        .ok_or_else(|| ClientError::UnexpectedPayload {
            url: url.to_string(),
            message: format!("no series named '{}'", name),
        })?;

    let points: BTreeMap<DateTime<Utc>, f64> = series
        .data
        .iter()
        .filter_map(|(millis, value)| Some((DateTime::from_timestamp_millis(*millis)?, (*value)?)))
        .collect();
    Ok(points.into_iter().collect())
}
