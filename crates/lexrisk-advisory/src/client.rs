//! HTTP client for the external advisory narrative service.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use lexrisk_core::{AdvisoryConfig, ComparisonResult, ContractSummary};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::local;

const BUDGET_WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum AdvisoryError {
    #[error("advisory endpoint not configured")]
    Disabled,

    #[error("advisory request timed out")]
    Timeout,

    #[error("advisory call budget exhausted ({0} calls/minute)")]
    Budget(u32),

    #[error("advisory HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("advisory server returned {status}: {body}")]
    Server { status: u16, body: String },

    #[error("malformed advisory response: {0}")]
    Malformed(String),
}

/// Fixed-window per-minute call budget.
struct CallBudget {
    per_minute: u32,
    window_start: Instant,
    used: u32,
}

impl CallBudget {
    fn new(per_minute: u32) -> Self {
        Self {
            per_minute,
            window_start: Instant::now(),
            used: 0,
        }
    }

    fn try_acquire(&mut self) -> bool {
        if self.window_start.elapsed() >= BUDGET_WINDOW {
            self.window_start = Instant::now();
            self.used = 0;
        }
        if self.used >= self.per_minute {
            return false;
        }
        self.used += 1;
        true
    }
}

#[derive(Serialize)]
struct AdvisoryRequest<'a, T: Serialize> {
    excerpt: &'a str,
    analysis: &'a T,
}

#[derive(Deserialize)]
struct AdvisoryResponse {
    narrative: String,
}

/// Narrative produced for an analysis, remote or local.
#[derive(Debug, Clone)]
pub struct AdvisoryOutcome {
    pub narrative: String,
    /// True when the narrative came from the local rule-based fallback.
    pub degraded: bool,
    /// Present when the remote call failed; analysis output is unaffected.
    pub warning: Option<String>,
    pub generated_at: DateTime<Utc>,
}

/// Client for the advisory narrative service.
///
/// Requests carry a timeout and are subject to a per-minute call budget;
/// a rejected or failed call is recovered by [`AdvisoryClient::advise_summary`]
/// and [`AdvisoryClient::advise_comparison`], which never fail.
pub struct AdvisoryClient {
    client: reqwest::Client,
    endpoint: String,
    budget: Mutex<CallBudget>,
}

impl AdvisoryClient {
    pub fn new(config: &AdvisoryConfig) -> Result<Self, AdvisoryError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            budget: Mutex::new(CallBudget::new(config.per_minute_budget)),
        })
    }

    /// Request a narrative for an analysis from the remote service.
    ///
    /// Fails fast, without I/O, when no endpoint is configured or the
    /// per-minute budget is exhausted.
    pub async fn request<T: Serialize>(
        &self,
        excerpt: &str,
        analysis: &T,
    ) -> Result<String, AdvisoryError> {
        if self.endpoint.is_empty() {
            return Err(AdvisoryError::Disabled);
        }

        {
            let mut budget = self
                .budget
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            if !budget.try_acquire() {
                return Err(AdvisoryError::Budget(budget.per_minute));
            }
        }

        let url = format!("{}/api/advisory", self.endpoint);
        let body = AdvisoryRequest { excerpt, analysis };

        info!(url = %url, "requesting advisory narrative");
        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AdvisoryError::Timeout
                } else {
                    AdvisoryError::Http(e)
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AdvisoryError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: AdvisoryResponse = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                AdvisoryError::Timeout
            } else {
                AdvisoryError::Malformed(e.to_string())
            }
        })?;
        Ok(parsed.narrative)
    }

    /// Narrative for a contract summary. Never fails: on any error the
    /// local rule-based assessment is returned with a warning attached.
    pub async fn advise_summary(
        &self,
        contract_excerpt: &str,
        summary: &ContractSummary,
    ) -> AdvisoryOutcome {
        match self.request(contract_excerpt, summary).await {
            Ok(narrative) => remote_outcome(narrative),
            Err(err) => {
                warn!(
                    %err,
                    jurisdiction = %summary.jurisdiction,
                    "advisory unavailable, using local narrative"
                );
                degraded_outcome(local::assessment(summary), err)
            }
        }
    }

    /// Narrative for a jurisdiction comparison. Never fails.
    pub async fn advise_comparison(
        &self,
        contract_excerpt: &str,
        comparison: &ComparisonResult,
    ) -> AdvisoryOutcome {
        match self.request(contract_excerpt, comparison).await {
            Ok(narrative) => remote_outcome(narrative),
            Err(err) => {
                warn!(%err, "advisory unavailable, using local comparison narrative");
                degraded_outcome(local::comparison(comparison), err)
            }
        }
    }
}

fn remote_outcome(narrative: String) -> AdvisoryOutcome {
    AdvisoryOutcome {
        narrative,
        degraded: false,
        warning: None,
        generated_at: Utc::now(),
    }
}

fn degraded_outcome(narrative: String, err: AdvisoryError) -> AdvisoryOutcome {
    AdvisoryOutcome {
        narrative,
        degraded: true,
        warning: Some(err.to_string()),
        generated_at: Utc::now(),
    }
}
