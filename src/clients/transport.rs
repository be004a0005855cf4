//! The HTTP seam shared by the monitoring and weather clients.

use crate::clients::error::ClientError;
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Sends one GET request and returns the decoded JSON body.
///
/// Implementations must turn any non-success status into [`ClientError::Upstream`].
#[async_trait]
pub trait JsonTransport: Send + Sync {
    async fn get_json(&self, url: &str, query: &[(String, String)]) -> Result<Value, ClientError>;
}

/// [`JsonTransport`] over `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ClientError::HttpClient)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl JsonTransport for HttpTransport {
    async fn get_json(&self, url: &str, query: &[(String, String)]) -> Result<Value, ClientError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| ClientError::NetworkRequest(url.to_string(), e))?;

        let status = response.status();
        if !status.is_success() {
            warn!("HTTP error for {}: {}", url, status);
            return Err(ClientError::Upstream {
                url: url.to_string(),
                status,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ClientError::JsonParse(url.to_string(), e))
    }
}
