// src/metrics/collector.rs
use crate::stats::DomainSnapshot;
use anyhow::Result;
use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};

/// Gauges exported for every domain.
pub struct DomainGauges {
    registry: Registry,
    pub availability_percentage: GaugeVec,
    pub response_latency_ms: GaugeVec,
}

impl DomainGauges {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let availability_percentage = GaugeVec::new(
            Opts::new("availability_percentage", "Availability of the domain"),
            &["domain"],
        )?;
        registry.register(Box::new(availability_percentage.clone()))?;

        let response_latency_ms = GaugeVec::new(
            Opts::new(
                "response_latency_ms",
                "Response latency in milliseconds",
            ),
            &["domain"],
        )?;
        registry.register(Box::new(response_latency_ms.clone()))?;

        Ok(Self {
            registry,
            availability_percentage,
            response_latency_ms,
        })
    }

    pub fn set(&self, domain: &str, stats: &DomainSnapshot) {
        self.availability_percentage
            .with_label_values(&[domain])
            .set(f64::from(stats.availability_pct));
        self.response_latency_ms
            .with_label_values(&[domain])
            .set(stats.avg_latency_ms);
    }

    /// Text exposition format, as accepted by a Prometheus push gateway.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(buffer)
    }
}

/// Encode the gauge pair for a single domain. Each domain is pushed as its
/// own job, so every push gets a fresh registry.
pub fn encode_domain_metrics(domain: &str, stats: &DomainSnapshot) -> Result<Vec<u8>> {
    let gauges = DomainGauges::new()?;
    gauges.set(domain, stats);
    gauges.encode()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn encodes_both_gauges_with_domain_label() {
        let stats = DomainSnapshot {
            availability_pct: 75,
            avg_latency_ms: 120.5,
            up_count: 3,
            total_count: 4,
            last_checked: Utc::now(),
        };

        let body = String::from_utf8(encode_domain_metrics("example.com", &stats).unwrap()).unwrap();
        assert!(body.contains("# TYPE availability_percentage gauge"));
        assert!(body.contains(r#"availability_percentage{domain="example.com"} 75"#));
        assert!(body.contains(r#"response_latency_ms{domain="example.com"} 120.5"#));
    }
}
