mod collector;
mod push;

pub use collector::{encode_domain_metrics, DomainGauges};
pub use push::{MetricsSink, PushError, PushGateway, PushReporter};
