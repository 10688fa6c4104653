// src/lib.rs
pub mod app;
pub mod config;
pub mod health;
pub mod metrics;
pub mod report;
pub mod server;
pub mod stats;
