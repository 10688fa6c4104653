mod aggregator;
mod snapshot;

pub use aggregator::DomainAggregator;
pub use snapshot::{DomainSnapshot, Snapshot};
