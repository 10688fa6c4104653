// src/app.rs
// Wires config, prober, scheduler, and reporters together.
use crate::config::Config;
use crate::health::{HttpProber, Prober, RoundScheduler};
use crate::metrics::{PushGateway, PushReporter};
use crate::report::ConsoleReporter;
use crate::server::{HttpServer, ServerBuilder, StatusHandler};
use crate::stats::DomainAggregator;
use anyhow::{Context, Result};
use std::future::Future;
use std::sync::Arc;
use tracing::{error, info};

pub struct Monitor {
    aggregator: Arc<DomainAggregator>,
    scheduler: Arc<RoundScheduler>,
    status_server: Option<HttpServer<StatusHandler>>,
}

impl Monitor {
    /// Build every component and bind the status server. Fails before any
    /// round runs if something cannot be set up.
    pub async fn build(config: Config) -> Result<Self> {
        let prober: Arc<dyn Prober> =
            Arc::new(HttpProber::from_settings(&config.settings).context("Failed to create HTTP client")?);
        Self::build_with_prober(config, prober).await
    }

    pub async fn build_with_prober(config: Config, prober: Arc<dyn Prober>) -> Result<Self> {
        let settings = config.settings;
        let aggregator = Arc::new(DomainAggregator::new());

        let mut scheduler = RoundScheduler::new(
            config.endpoints,
            prober,
            aggregator.clone(),
            settings.concurrency,
            settings.interval(),
        )
        .with_observer(Arc::new(ConsoleReporter));

        if settings.pushgateway.enabled {
            let gateway = PushGateway::new(&settings.pushgateway.address, settings.timeout())
                .context("Failed to configure push gateway")?;
            info!("Pushing metrics to {}", settings.pushgateway.address);
            scheduler = scheduler.with_observer(Arc::new(PushReporter::new(Arc::new(gateway))));
        }

        let status_server = if settings.status_server.enabled {
            let addr = settings.status_server.socket_addr()?;
            let server = ServerBuilder::new(addr)
                .with_handler(StatusHandler::new(aggregator.clone()))
                .bind()
                .await?;
            Some(server)
        } else {
            None
        };

        Ok(Self {
            aggregator,
            scheduler: Arc::new(scheduler),
            status_server,
        })
    }

    pub fn aggregator(&self) -> Arc<DomainAggregator> {
        self.aggregator.clone()
    }

    pub fn status_addr(&self) -> Option<std::net::SocketAddr> {
        self.status_server
            .as_ref()
            .and_then(|server| server.local_addr().ok())
    }

    /// Run rounds and serve queries until `shutdown` resolves, then let the
    /// current round finish before returning.
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let (stop_tx, stop_rx) = tokio::sync::watch::channel(false);

        let server_task = self.status_server.map(|server| {
            let mut stop_rx = stop_rx.clone();
            tokio::spawn(async move {
                let stopped = async move {
                    let _ = stop_rx.wait_for(|stop| *stop).await;
                };
                if let Err(e) = server.serve(stopped).await {
                    error!("Status server error: {}", e);
                }
            })
        });

        let scheduler_task = tokio::spawn(self.scheduler.clone().run());

        shutdown.await;
        info!("Stopping monitor; waiting for the current round to finish");

        self.scheduler.shutdown();
        let _ = stop_tx.send(true);

        scheduler_task.await.context("Round scheduler task failed")?;
        if let Some(task) = server_task {
            task.await.context("Status server task failed")?;
        }

        info!("Monitoring stopped");
        Ok(())
    }
}
