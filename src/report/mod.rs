// src/report/mod.rs
use crate::health::{RoundObserver, RoundReport};
use crate::stats::Snapshot;
use async_trait::async_trait;
use tracing::info;

/// Logs one availability line per domain after every round.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn summary_lines(snapshot: &Snapshot) -> Vec<String> {
        snapshot
            .domains
            .iter()
            .map(|(domain, stats)| {
                format!(
                    "{} has {}% availability with avg latency {:.2}ms",
                    domain, stats.availability_pct, stats.avg_latency_ms
                )
            })
            .collect()
    }
}

#[async_trait]
impl RoundObserver for ConsoleReporter {
    async fn round_complete(&self, report: &RoundReport) {
        for line in Self::summary_lines(&report.snapshot) {
            info!(round = report.round, "{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::DomainSnapshot;
    use chrono::Utc;
    use std::collections::BTreeMap;

    #[test]
    fn one_line_per_domain_in_domain_order() {
        let stat = |pct, latency| DomainSnapshot {
            availability_pct: pct,
            avg_latency_ms: latency,
            up_count: 1,
            total_count: 1,
            last_checked: Utc::now(),
        };
        let snapshot = Snapshot {
            taken_at: Utc::now(),
            domains: BTreeMap::from([
                ("b.com".to_string(), stat(50, 0.0)),
                ("a.com".to_string(), stat(100, 123.456)),
            ]),
        };

        assert_eq!(
            ConsoleReporter::summary_lines(&snapshot),
            vec![
                "a.com has 100% availability with avg latency 123.46ms".to_string(),
                "b.com has 50% availability with avg latency 0.00ms".to_string(),
            ]
        );
    }
}
