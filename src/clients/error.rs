use crate::store::error::StoreError;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Daily request budget exhausted: {count} request(s) made on {day}, limit is {limit}")]
    RateLimitExceeded {
        day: NaiveDate,
        count: u32,
        limit: u32,
    },

    #[error("HTTP request failed for {url} with status {status}")]
    Upstream {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("Failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),

    #[error("Failed to parse JSON response from {0}")]
    JsonParse(String, #[source] reqwest::Error),

    #[error("Response from {0} does not have the expected shape")]
    Decode(String, #[source] serde_json::Error),

    #[error("Unexpected response from {url}: {message}")]
    UnexpectedPayload { url: String, message: String },

    #[error("Failed to read or write the request budget")]
    Budget(#[from] StoreError),
}
