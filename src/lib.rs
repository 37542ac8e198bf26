//! anomalyscope -- Mock telemetry backend for an anomaly-detection dashboard.
//!
//! This crate provides a synthetic log/alert store, the query, metrics and
//! trend services the dashboard reads from, a simulated realtime log feed,
//! log export, and an HTTP API exposing all of it.

pub mod api;
pub mod config;
pub mod export;
pub mod insight;
pub mod latency;
pub mod notify;
pub mod query;
pub mod realtime;
pub mod settings;
pub mod telemetry;

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::AppConfig;
use crate::settings::SettingsStore;
use crate::telemetry::TelemetryStore;

/// Generate the store once, honouring a configured seed.
pub fn build_store(config: &AppConfig) -> Arc<TelemetryStore> {
    let store = match config.telemetry.seed {
        Some(seed) => TelemetryStore::with_seed(seed),
        None => TelemetryStore::random(),
    };
    Arc::new(store)
}

/// Start the anomalyscope daemon: telemetry store, live feed, and API server.
pub async fn serve(config: &AppConfig) -> Result<()> {
    // 1. Generate telemetry
    let store = build_store(config);

    // 2. Load client settings
    tracing::info!(path = %config.settings.path.display(), "Loading settings");
    let settings = SettingsStore::open(&config.settings.path);

    // 3. Wire services and subscribe the dashboard feed
    let state = api::state::AppState::new(store, config, settings);
    let _feed = state.watch_feed();

    // 4. Start API Server
    let addr: std::net::SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("invalid bind address '{}'", config.server.bind))?;
    let app = api::router(state);

    tracing::info!(%addr, "anomalyscope listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("anomalyscope stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
