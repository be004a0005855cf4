//! Typed SolarEdge monitoring API endpoints.

use crate::clients::error::ClientError;
use crate::clients::rate_limited_client::RateLimitedClient;
use crate::clients::{date_prefix, decode};
use crate::types::fetch_window::FetchWindow;
use crate::types::sample::{TimestampedValue, TIMESTAMP_FORMAT};
use chrono::{NaiveDate, NaiveDateTime};
use log::info;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

const REQUEST_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Site {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct SiteList {
    #[serde(default)]
    site: Vec<Site>,
}

/// The range of days for which a site has production data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPeriod {
    #[serde(deserialize_with = "date_prefix")]
    pub start_date: NaiveDate,
    #[serde(deserialize_with = "date_prefix")]
    pub end_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
struct EnergyResponse {
    energy: EnergyValues,
}

#[derive(Debug, Deserialize)]
struct EnergyValues {
    #[serde(default)]
    values: Vec<EnergyValue>,
}

#[derive(Debug, Deserialize)]
struct EnergyValue {
    #[serde(deserialize_with = "local_timestamp")]
    date: NaiveDateTime,
    value: Option<f64>,
}

/// SolarEdge endpoints, every call budgeted by the wrapped [`RateLimitedClient`].
pub struct MonitoringApi {
    client: RateLimitedClient,
}

impl MonitoringApi {
    pub fn new(client: RateLimitedClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &RateLimitedClient {
        &self.client
    }

    /// Sites visible to the API key.
    pub async fn sites(&self) -> Result<Vec<Site>, ClientError> {
        let endpoint = "/sites/list";
        let body = self.client.call(endpoint, &[]).await?;
        let list: SiteList = decode(endpoint, unwrap_envelope(body, "sites"))?;
        for site in &list.site {
            info!("Site {}: {}", site.id, site.name);
        }
        Ok(list.site)
    }

    pub async fn data_period(&self, site_id: u64) -> Result<DataPeriod, ClientError> {
        let endpoint = format!("/site/{}/dataPeriod", site_id);
        let body = self.client.call(&endpoint, &[]).await?;
        decode(&endpoint, unwrap_envelope(body, "dataPeriod"))
    }

    /// Quarter-hour energy values for every day of `window`, timestamps in site-local time.
    pub async fn energy(
        &self,
        site_id: u64,
        window: FetchWindow,
    ) -> Result<Vec<TimestampedValue>, ClientError> {
        let endpoint = format!("/site/{}/energy", site_id);
        let params = [
            ("timeUnit", "QUARTER_OF_AN_HOUR".to_string()),
            ("startDate", window.start.format(REQUEST_DATE_FORMAT).to_string()),
            ("endDate", window.end.format(REQUEST_DATE_FORMAT).to_string()),
        ];
        let body = self.client.call(&endpoint, &params).await?;
        let response: EnergyResponse = decode(&endpoint, body)?;
        Ok(response
            .energy
            .values
            .into_iter()
            .map(|v| TimestampedValue::new(v.date, v.value))
            .collect())
    }
}

/// Returns the object under `key`, or `value` itself when it is not wrapped.
fn unwrap_envelope(mut value: Value, key: &str) -> Value {
    match value.get_mut(key).map(Value::take) {
        Some(inner) => inner,
        None => value,
    }
}

fn local_timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
    let raw = String::deserialize(deserializer)?;
    NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(D::Error::custom)
}
