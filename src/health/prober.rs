// src/health/prober.rs
use super::result::ProbeResult;
use crate::config::{Endpoint, Settings};
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Executes one probe against one endpoint. Never fails: transport
/// problems are reported through the returned `ProbeResult`.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, endpoint: &Endpoint) -> ProbeResult;
}

pub struct HttpProber {
    client: Client,
    latency_threshold: Duration,
}

impl HttpProber {
    pub fn new(timeout: Duration, latency_threshold: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            latency_threshold,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(settings.timeout(), settings.latency_threshold())
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, endpoint: &Endpoint) -> ProbeResult {
        info!("Checking: {} ({})", endpoint.label(), endpoint.url);

        let mut request = self
            .client
            .request(endpoint.method.clone(), endpoint.url.clone())
            .headers(endpoint.headers.clone());
        if let Some(body) = &endpoint.body {
            request = request.json(body);
        }

        // Latency covers the whole exchange, body included; the client
        // timeout bounds the body read as well.
        let start = Instant::now();
        let result = match request.send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                match response.bytes().await {
                    Ok(_) => ProbeResult::classify(status, start.elapsed(), self.latency_threshold),
                    Err(e) => failure(e),
                }
            }
            Err(e) => failure(e),
        };

        match &result {
            ProbeResult::Up { status, latency_ms } | ProbeResult::Down { status, latency_ms } => {
                debug!(
                    endpoint = endpoint.label(),
                    "Response Status: {}, Latency: {:.2}ms", status, latency_ms
                );
            }
            ProbeResult::TimedOut => debug!(endpoint = endpoint.label(), "Request timed out"),
            ProbeResult::TransportError { error } => {
                debug!(endpoint = endpoint.label(), "Request failed: {}", error)
            }
        }

        result
    }
}

fn failure(e: reqwest::Error) -> ProbeResult {
    if e.is_timeout() {
        ProbeResult::TimedOut
    } else {
        ProbeResult::transport_error(e.to_string())
    }
}
