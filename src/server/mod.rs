//! HTTP surface: dashboard page, JSON snapshot and health check

pub mod render;
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use crate::models::PeriodClock;
use crate::tracker::refresh::DEFAULT_POLL_INTERVAL;
use crate::tracker::registry::AccountRegistry;

pub use routes::create_router;

/// How snapshots are presented
#[derive(Debug, Clone)]
pub struct DisplayConfig {
    /// Page auto-refresh period
    pub refresh_interval: Duration,
    /// Snapshots older than this are flagged stale
    pub stale_after: Duration,
    /// Clock used to age snapshots; matches the refresh loop's
    pub period_clock: PeriodClock,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_POLL_INTERVAL,
            stale_after: DEFAULT_POLL_INTERVAL * 3,
            period_clock: PeriodClock::default(),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<AccountRegistry>,
    pub display: DisplayConfig,
}

impl AppState {
    pub fn new(registry: Arc<AccountRegistry>, display: DisplayConfig) -> Self {
        Self { registry, display }
    }
}

/// Serve the router until the listener fails
pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Dashboard listening on http://{}", addr);

    axum::serve(listener, create_router(state))
        .await
        .context("Server error")?;

    Ok(())
}
