// src/health/result.rs
use std::time::Duration;

/// Outcome of a single probe attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeResult {
    /// Answered with a 2xx status under the latency threshold.
    Up { status: u16, latency_ms: f64 },
    /// Answered, but with a non-2xx status or too slowly.
    Down { status: u16, latency_ms: f64 },
    TimedOut,
    TransportError { error: String },
}

impl ProbeResult {
    /// Apply the up/down rule to a completed response: 2xx AND strictly
    /// faster than `threshold`.
    pub fn classify(status: u16, elapsed: Duration, threshold: Duration) -> Self {
        let latency_ms = elapsed.as_micros() as f64 / 1000.0;
        if (200..300).contains(&status) && elapsed < threshold {
            ProbeResult::Up { status, latency_ms }
        } else {
            ProbeResult::Down { status, latency_ms }
        }
    }

    pub fn transport_error(error: impl Into<String>) -> Self {
        ProbeResult::TransportError {
            error: error.into(),
        }
    }

    pub fn is_up(&self) -> bool {
        matches!(self, ProbeResult::Up { .. })
    }

    /// Measured latency; absent when no response arrived.
    pub fn latency_ms(&self) -> Option<f64> {
        match self {
            ProbeResult::Up { latency_ms, .. } | ProbeResult::Down { latency_ms, .. } => {
                Some(*latency_ms)
            }
            ProbeResult::TimedOut | ProbeResult::TransportError { .. } => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ProbeResult::Up { status, .. } | ProbeResult::Down { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A probe result tagged with the domain it counts towards.
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub domain: String,
    pub result: ProbeResult,
}

impl ProbeOutcome {
    pub fn new(domain: impl Into<String>, result: ProbeResult) -> Self {
        Self {
            domain: domain.into(),
            result,
        }
    }

    pub fn is_up(&self) -> bool {
        self.result.is_up()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLD: Duration = Duration::from_millis(500);

    #[test]
    fn fast_2xx_is_up() {
        let result = ProbeResult::classify(200, Duration::from_millis(499), THRESHOLD);
        assert!(result.is_up());
        assert_eq!(result.latency_ms(), Some(499.0));
    }

    #[test]
    fn slow_2xx_is_down() {
        let result = ProbeResult::classify(200, Duration::from_millis(501), THRESHOLD);
        assert!(!result.is_up());
        assert_eq!(result.status(), Some(200));
    }

    #[test]
    fn threshold_itself_is_down() {
        assert!(!ProbeResult::classify(204, THRESHOLD, THRESHOLD).is_up());
    }

    #[test]
    fn non_2xx_is_down_even_when_fast() {
        assert!(!ProbeResult::classify(404, Duration::from_millis(10), THRESHOLD).is_up());
        assert!(!ProbeResult::classify(301, Duration::from_millis(10), THRESHOLD).is_up());
        assert!(!ProbeResult::classify(199, Duration::from_millis(10), THRESHOLD).is_up());
        assert!(ProbeResult::classify(299, Duration::from_millis(10), THRESHOLD).is_up());
    }

    #[test]
    fn failures_have_no_latency() {
        assert_eq!(ProbeResult::TimedOut.latency_ms(), None);
        assert_eq!(ProbeResult::transport_error("refused").latency_ms(), None);
        assert!(!ProbeResult::TimedOut.is_up());
    }
}
