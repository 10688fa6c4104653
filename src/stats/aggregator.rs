// src/stats/aggregator.rs
use super::snapshot::{DomainSnapshot, Snapshot};
use crate::health::{ProbeOutcome, ProbeResult};
use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Cumulative counters for one domain.
#[derive(Debug, Clone)]
struct DomainStats {
    pub up_count: u64,
    pub total_count: u64,
    // "up" latencies are folded into a running sum instead of kept as samples.
    latency_samples: u64,
    latency_sum_ms: f64,
    last_checked: DateTime<Utc>,
}

impl DomainStats {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            up_count: 0,
            total_count: 0,
            latency_samples: 0,
            latency_sum_ms: 0.0,
            last_checked: now,
        }
    }

    fn observe(&mut self, result: &ProbeResult, now: DateTime<Utc>) {
        self.total_count += 1;
        self.last_checked = now;

        if result.is_up() {
            self.up_count += 1;
            if let Some(latency_ms) = result.latency_ms() {
                self.latency_samples += 1;
                self.latency_sum_ms += latency_ms;
            }
        }
    }

    /// `round(100 * up / total)`, rounding halves up. Zero when nothing
    /// has been recorded.
    pub fn availability_pct(&self) -> u8 {
        if self.total_count == 0 {
            return 0;
        }
        let pct = (200 * self.up_count + self.total_count) / (2 * self.total_count);
        pct.min(100) as u8
    }

    pub fn avg_latency_ms(&self) -> f64 {
        if self.latency_samples == 0 {
            0.0
        } else {
            self.latency_sum_ms / self.latency_samples as f64
        }
    }

    fn snapshot(&self) -> DomainSnapshot {
        DomainSnapshot {
            availability_pct: self.availability_pct(),
            avg_latency_ms: self.avg_latency_ms(),
            up_count: self.up_count,
            total_count: self.total_count,
            last_checked: self.last_checked,
        }
    }
}

/// Owns the per-domain statistics.
///
/// Writers are serialized by a single mutex. After every update the new
/// state is published as an immutable [`Snapshot`], so readers never wait
/// on a round in progress and never see a half-applied update.
pub struct DomainAggregator {
    stats: Mutex<BTreeMap<String, DomainStats>>,
    published: ArcSwap<Snapshot>,
}

impl Default for DomainAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl DomainAggregator {
    pub fn new() -> Self {
        Self {
            stats: Mutex::new(BTreeMap::new()),
            published: ArcSwap::from_pointee(Snapshot::empty()),
        }
    }

    pub async fn record(&self, outcome: &ProbeOutcome) {
        let now = Utc::now();
        let mut stats = self.stats.lock().await;

        stats
            .entry(outcome.domain.clone())
            .or_insert_with(|| DomainStats::new(now))
            .observe(&outcome.result, now);

        // Published while still holding the lock so snapshots are stored in
        // the same order as the updates they reflect.
        self.published.store(Arc::new(Self::build_snapshot(&stats, now)));
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.published.load_full()
    }

    fn build_snapshot(stats: &BTreeMap<String, DomainStats>, now: DateTime<Utc>) -> Snapshot {
        let domains = stats
            .iter()
            .filter(|(_, s)| s.total_count > 0)
            .map(|(domain, s)| (domain.clone(), s.snapshot()))
            .collect();

        Snapshot {
            taken_at: now,
            domains,
        }
    }
}
