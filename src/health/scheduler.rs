// src/health/scheduler.rs
use super::prober::Prober;
use super::result::{ProbeOutcome, ProbeResult};
use crate::config::Endpoint;
use crate::stats::{DomainAggregator, Snapshot};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Semaphore};
use tokio::time::sleep;
use tracing::{debug, error, info};

/// Everything a consumer gets to see when a round finishes.
#[derive(Debug, Clone)]
pub struct RoundReport {
    pub round: u64,
    pub outcomes: Vec<ProbeOutcome>,
    pub snapshot: Arc<Snapshot>,
}

impl RoundReport {
    pub fn up_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_up()).count()
    }
}

/// Notified exactly once per round, after every outcome has been recorded.
#[async_trait]
pub trait RoundObserver: Send + Sync {
    async fn round_complete(&self, report: &RoundReport);
}

pub struct RoundScheduler {
    endpoints: Vec<Arc<Endpoint>>,
    prober: Arc<dyn Prober>,
    aggregator: Arc<DomainAggregator>,
    observers: Vec<Arc<dyn RoundObserver>>,
    concurrency: usize,
    interval: Duration,
    rounds: AtomicU64,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl RoundScheduler {
    pub fn new(
        endpoints: Vec<Endpoint>,
        prober: Arc<dyn Prober>,
        aggregator: Arc<DomainAggregator>,
        concurrency: usize,
        interval: Duration,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Self {
            endpoints: endpoints.into_iter().map(Arc::new).collect(),
            prober,
            aggregator,
            observers: Vec::new(),
            concurrency: concurrency.max(1),
            interval,
            rounds: AtomicU64::new(0),
            shutdown_tx,
            shutdown_rx,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn RoundObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn rounds_completed(&self) -> u64 {
        self.rounds.load(Ordering::SeqCst)
    }

    /// Run rounds until [`shutdown`](Self::shutdown) is called. A round that
    /// is already probing when shutdown is requested finishes first.
    pub async fn run(self: Arc<Self>) {
        let mut shutdown_rx = self.shutdown_rx.clone();

        info!(
            "Starting round scheduler: {} endpoints, concurrency {}, interval {:?}",
            self.endpoints.len(),
            self.concurrency,
            self.interval
        );

        loop {
            if *shutdown_rx.borrow_and_update() {
                break;
            }

            self.run_round().await;

            tokio::select! {
                _ = sleep(self.interval) => {}
                _ = shutdown_rx.changed() => {}
            }
        }

        info!("Round scheduler stopped after {} rounds", self.rounds_completed());
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Probe every endpoint once, record all outcomes, then notify observers.
    pub async fn run_round(&self) -> RoundReport {
        let round = self.rounds.load(Ordering::SeqCst) + 1;
        debug!("Starting round {}", round);

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = Vec::with_capacity(self.endpoints.len());

        for endpoint in &self.endpoints {
            let endpoint = endpoint.clone();
            let prober = self.prober.clone();
            let semaphore = semaphore.clone();
            let task = tokio::spawn(async move {
                // The semaphore is never closed.
                let _permit = semaphore.acquire_owned().await.ok();
                prober.probe(&endpoint).await
            });
            tasks.push(task);
        }

        // Barrier: wait for every probe of this round.
        let results = futures::future::join_all(tasks).await;

        let mut outcomes = Vec::with_capacity(results.len());
        for (endpoint, result) in self.endpoints.iter().zip(results) {
            let result = match result {
                Ok(result) => result,
                Err(e) => {
                    error!("Probe task for {} failed: {}", endpoint.label(), e);
                    ProbeResult::transport_error(format!("probe task failed: {}", e))
                }
            };

            let outcome = ProbeOutcome::new(&endpoint.domain, result);
            info!(
                "Checked: {} | Domain: {} | Status: {} | Latency: {}",
                endpoint.url,
                outcome.domain,
                if outcome.is_up() { "UP" } else { "DOWN" },
                outcome
                    .result
                    .latency_ms()
                    .map(|ms| format!("{:.2}ms", ms))
                    .unwrap_or_else(|| "N/A".to_string())
            );

            self.aggregator.record(&outcome).await;
            outcomes.push(outcome);
        }

        let report = RoundReport {
            round,
            outcomes,
            snapshot: self.aggregator.snapshot(),
        };

        for observer in &self.observers {
            observer.round_complete(&report).await;
        }

        self.rounds.store(round, Ordering::SeqCst);
        info!(
            "Round {} complete: {} up, {} down",
            round,
            report.up_count(),
            report.outcomes.len() - report.up_count()
        );

        report
    }
}
