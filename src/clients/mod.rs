pub mod error;
pub mod knmi;
pub mod monitoring;
pub mod rate_limited_client;
pub mod transport;

use crate::clients::error::ClientError;
use chrono::NaiveDate;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn decode<T: DeserializeOwned>(url: &str, value: Value) -> Result<T, ClientError> {
    serde_json::from_value(value).map_err(|e| ClientError::Decode(url.to_string(), e))
}

// Providers report dates as `YYYY-MM-DD`, sometimes with a time of day appended.
fn date_prefix<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    let raw = String::deserialize(deserializer)?;
    let date = raw.get(..10).unwrap_or(&raw);
    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(D::Error::custom)
}
