// ────────────────────────────────
// src/server/builder.rs
// ────────────────────────────────
use crate::server::listener::bind_tcp;
use anyhow::{anyhow, Result};
use hyper::{server::conn::Http, Body, Request, Response};
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower::Service;

/// Builder so `main.rs` can inject the status handler (or any handler).
pub struct ServerBuilder<H> {
    addr: SocketAddr,
    handler: Option<H>,
}

impl<H> ServerBuilder<H>
where
    H: Service<Request<Body>, Response = Response<Body>> + Send + Clone + 'static,
    H::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    H::Future: Send + 'static,
{
    pub fn new(addr: SocketAddr) -> Self {
        Self { addr, handler: None }
    }

    pub fn with_handler(mut self, handler: H) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Bind the TCP socket now so a taken port fails startup instead of a
    /// background task.
    pub async fn bind(self) -> Result<HttpServer<H>> {
        let handler = self
            .handler
            .ok_or_else(|| anyhow!("handler must be set via with_handler()"))?;
        let listener = bind_tcp(self.addr).await?;

        Ok(HttpServer { listener, handler })
    }
}

pub struct HttpServer<H> {
    listener: TcpListener,
    handler: H,
}

impl<H> HttpServer<H>
where
    H: Service<Request<Body>, Response = Response<Body>> + Send + Clone + 'static,
    H::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    H::Future: Send + 'static,
{
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until `shutdown` resolves. Each connection is
    /// served on its own task.
    pub async fn serve<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let addr = self.local_addr()?;
        tracing::info!("HTTP server listening on {}", addr);

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("HTTP server on {} shutting down", addr);
                    break;
                }
                accepted = self.listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(conn) => conn,
                        Err(err) => {
                            tracing::warn!(%err, "accept error");
                            continue;
                        }
                    };
                    let svc = self.handler.clone();

                    tokio::spawn(async move {
                        let http = Http::new();
                        if let Err(err) = http.serve_connection(stream, svc).await {
                            tracing::warn!(%peer, %err, "connection error");
                        }
                    });
                }
            }
        }

        Ok(())
    }
}
