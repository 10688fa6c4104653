// src/stats/snapshot.rs
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Point-in-time view of one domain's statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainSnapshot {
    pub availability_pct: u8,
    pub avg_latency_ms: f64,
    pub up_count: u64,
    pub total_count: u64,
    pub last_checked: DateTime<Utc>,
}

/// Point-in-time view of every domain observed so far.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub taken_at: DateTime<Utc>,
    pub domains: BTreeMap<String, DomainSnapshot>,
}

impl Snapshot {
    pub fn empty() -> Self {
        Self {
            taken_at: Utc::now(),
            domains: BTreeMap::new(),
        }
    }

    pub fn get(&self, domain: &str) -> Option<&DomainSnapshot> {
        self.domains.get(domain)
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Domain -> integer availability percentage.
    pub fn availability(&self) -> BTreeMap<String, u8> {
        self.domains
            .iter()
            .map(|(domain, stats)| (domain.clone(), stats.availability_pct))
            .collect()
    }
}
