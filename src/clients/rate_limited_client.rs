//! Budgeted access to the monitoring API.

use crate::clients::error::ClientError;
use crate::clients::transport::JsonTransport;
use crate::clock::Clock;
use crate::store::budget_store::BudgetStore;
use crate::types::request_budget::{RequestBudget, RequestLimits};
use bon::bon;
use log::{debug, warn};
use serde_json::Value;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

pub const SOLAREDGE_BASE_URL: &str = "https://monitoringapi.solaredge.com";

/// Sends monitoring API requests while counting them against a daily budget.
///
/// The count for the current day is read from and written to the [`BudgetStore`] on
/// every call, so restarting the process does not reset it. The incremented count is
/// committed before the request goes out: an attempt that fails in flight still counts.
pub struct RateLimitedClient {
    transport: Arc<dyn JsonTransport>,
    budget: BudgetStore,
    clock: Arc<dyn Clock>,
    api_key: String,
    base_url: String,
    limits: RequestLimits,
    past_soft: AtomicU32,
}

#[bon]
impl RateLimitedClient {
    /// # Optional Builder Methods
    ///
    /// * `.base_url(String)`: Defaults to [`SOLAREDGE_BASE_URL`].
    /// * `.soft_limit(u32)`: Count past which every call warns. Defaults to 250.
    /// * `.hard_limit(u32)`: Count at which calls are refused. Defaults to 275.
    #[builder]
    pub fn new(
        transport: Arc<dyn JsonTransport>,
        budget: BudgetStore,
        clock: Arc<dyn Clock>,
        #[builder(into)] api_key: String,
        #[builder(into)] base_url: Option<String>,
        soft_limit: Option<u32>,
        hard_limit: Option<u32>,
    ) -> Self {
        let defaults = RequestLimits::default();
        Self {
            transport,
            budget,
            clock,
            api_key,
            base_url: base_url
                .unwrap_or_else(|| SOLAREDGE_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            limits: RequestLimits {
                soft: soft_limit.unwrap_or(defaults.soft),
                hard: hard_limit.unwrap_or(defaults.hard),
            },
            past_soft: AtomicU32::new(0),
        }
    }

    /// Requests this client sent while today's count was past the soft limit.
    pub fn calls_past_soft_limit(&self) -> u32 {
        self.past_soft.load(Ordering::Relaxed)
    }

    /// Requests `endpoint` (a path such as `/sites/list`) with `params` plus the API key.
    ///
    /// # Errors
    ///
    /// * [`ClientError::RateLimitExceeded`] once the hard limit was reached today. No
    ///   request is sent in that case.
    /// * [`ClientError::Upstream`] for a non-success status.
    /// * [`ClientError::Budget`] if the counter cannot be read or written.
    pub async fn call(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Value, ClientError> {
        let spent = self.spend_one().await?;
        debug!(
            "Monitoring API request {} of {} today: {}",
            spent.count, self.limits.hard, endpoint
        );

        let url = format!("{}{}", self.base_url, endpoint);
        let mut query: Vec<(String, String)> = params
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect();
        query.push(("api_key".to_string(), self.api_key.clone()));

        self.transport.get_json(&url, &query).await
    }

    async fn spend_one(&self) -> Result<RequestBudget, ClientError> {
        let today = self.clock.today();
        let budget = self.budget.load(today).await?;
        if budget.count >= self.limits.hard {
            warn!(
                "Refusing monitoring API request: {} of {} allowed requests already made on {}",
                budget.count, self.limits.hard, today
            );
            return Err(ClientError::RateLimitExceeded {
                day: today,
                count: budget.count,
                limit: self.limits.hard,
            });
        }

        let spent = budget.incremented();
        self.budget.save(spent).await?;
        if spent.count > self.limits.soft {
            self.past_soft.fetch_add(1, Ordering::Relaxed);
            warn!(
                "Monitoring API request {} on {} is past the soft limit of {} (hard limit {})",
                spent.count, today, self.limits.soft, self.limits.hard
            );
        }
        Ok(spent)
    }
}
