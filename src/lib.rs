//! Bandmeter -- self-hosted bandwidth test server with persisted results.
//!
//! This crate provides fixed-behavior test-traffic endpoints (ping, streamed
//! random-byte download, consumed upload) that clients drive to measure their
//! own throughput and latency, plus a SQLite-backed store for the results
//! they report back.

pub mod api;
pub mod config;
pub mod results;
pub mod storage;
pub mod traffic;

use std::sync::Arc;

use anyhow::Result;

use crate::config::BandmeterConfig;

/// Start the bandmeter server: open the database, build the router, and
/// serve HTTP until shutdown.
pub async fn serve(config: BandmeterConfig) -> Result<()> {
    tracing::info!(db_path = %config.storage.database_path.display(), "initializing database");
    let pool = storage::open_pool(&config.storage.database_path)?;

    let addr: std::net::SocketAddr = config.server.bind.parse()?;
    let state = api::state::AppState {
        pool,
        config: Arc::new(config),
    };
    let app = api::router(state);

    tracing::info!(%addr, "bandmeter listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
