// src/health/mod.rs
mod prober;
mod result;
mod scheduler;

pub use prober::{HttpProber, Prober};
pub use result::{ProbeOutcome, ProbeResult};
pub use scheduler::{RoundObserver, RoundReport, RoundScheduler};
