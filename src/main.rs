// src/main.rs
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tokio::signal;
use tracing::{info, warn};

use uptime_monitor::{app::Monitor, config};

/// Probe HTTP endpoints on a fixed interval and report per-domain availability.
#[derive(Debug, Parser)]
#[command(name = "uptime-monitor", version)]
struct Cli {
    /// Path to the endpoint configuration (YAML or JSON)
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("uptime_monitor=info".parse()?)
                .add_directive("hyper=info".parse()?),
        )
        .init();

    info!("Loading configuration from: {}", cli.config.display());
    let config = config::load_config(&cli.config).await?;
    info!("Monitoring {} endpoints", config.endpoints.len());

    let monitor = Monitor::build(config).await?;
    if let Some(addr) = monitor.status_addr() {
        info!("Availability served at http://{}/status", addr);
    }

    monitor.run(shutdown_signal()).await
}

// Graceful shutdown handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
