// ────────────────────────────────
// src/server/listener.rs
// Low-level TCP bind for the status server.
// ────────────────────────────────
use anyhow::{Context, Result};
use std::net::SocketAddr;
use tokio::net::TcpListener;

pub async fn bind_tcp(addr: SocketAddr) -> Result<TcpListener> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    Ok(listener)
}
