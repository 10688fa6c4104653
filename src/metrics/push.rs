// src/metrics/push.rs
use super::collector::encode_domain_metrics;
use crate::health::{RoundObserver, RoundReport};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum PushError {
    #[error("Invalid push gateway address {0:?}")]
    InvalidAddress(String),

    #[error("Failed to encode metrics: {0}")]
    Encode(String),

    #[error("Push gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Push gateway rejected metrics with HTTP {0}")]
    Rejected(u16),
}

/// Destination for encoded metrics. One call per job.
#[async_trait]
pub trait MetricsSink: Send + Sync {
    async fn push(&self, job: &str, body: Vec<u8>) -> Result<(), PushError>;
}

/// Prometheus push gateway over HTTP.
pub struct PushGateway {
    base: Url,
    client: Client,
}

impl PushGateway {
    pub fn new(address: &str, timeout: Duration) -> Result<Self, PushError> {
        let with_scheme = if address.contains("://") {
            address.to_string()
        } else {
            format!("http://{}", address)
        };
        let base = Url::parse(&with_scheme)
            .ok()
            .filter(|url| !url.cannot_be_a_base() && url.host_str().is_some())
            .ok_or_else(|| PushError::InvalidAddress(address.to_string()))?;

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { base, client })
    }

    /// `{base}/metrics/job/{job}`, with `job` as a single path segment.
    pub fn job_url(&self, job: &str) -> Result<Url, PushError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| PushError::InvalidAddress(self.base.to_string()))?
            .pop_if_empty()
            .extend(["metrics", "job", job]);
        Ok(url)
    }
}

#[async_trait]
impl MetricsSink for PushGateway {
    async fn push(&self, job: &str, body: Vec<u8>) -> Result<(), PushError> {
        let url = self.job_url(job)?;
        let response = self
            .client
            .put(url)
            .header(reqwest::header::CONTENT_TYPE, prometheus::TEXT_FORMAT)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(PushError::Rejected(status.as_u16()))
        }
    }
}

/// Pushes every domain's gauges to a sink at the end of each round.
pub struct PushReporter {
    sink: Arc<dyn MetricsSink>,
}

impl PushReporter {
    pub fn new(sink: Arc<dyn MetricsSink>) -> Self {
        Self { sink }
    }

    /// Returns the number of domains pushed successfully. A failure for one
    /// domain is logged and does not stop the others.
    pub async fn push_all(&self, report: &RoundReport) -> usize {
        let mut pushed = 0;

        for (domain, stats) in &report.snapshot.domains {
            let result = match encode_domain_metrics(domain, stats) {
                Ok(body) => self.sink.push(domain, body).await,
                Err(e) => Err(PushError::Encode(e.to_string())),
            };

            match result {
                Ok(()) => {
                    pushed += 1;
                    debug!(domain = %domain, round = report.round, "Pushed metrics");
                }
                Err(e) => warn!(domain = %domain, round = report.round, "Failed to push metrics: {}", e),
            }
        }

        pushed
    }
}

#[async_trait]
impl RoundObserver for PushReporter {
    async fn round_complete(&self, report: &RoundReport) {
        self.push_all(report).await;
    }
}
