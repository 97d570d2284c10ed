//! Larkwire relay binary
//!
//! Binds the relay HTTP server, runs the correlation-store eviction sweep,
//! and serves until interrupted.

use std::sync::Arc;
use std::time::Duration;

use larkwire_common::InMemoryCorrelationStore;
use larkwire_domain::constants::CORRELATION_SWEEP_INTERVAL_SECS;
use larkwire_relay::{AppState, RelayConfig, RelayServer, UpstreamClient};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging first so .env loading is visible
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match dotenvy::dotenv() {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!("no .env file found, using process environment"),
    }

    let config = RelayConfig::from_env()?;
    info!(?config, "relay configuration loaded");

    let store = Arc::new(InMemoryCorrelationStore::new(config.correlation_ttl));
    spawn_eviction_sweep(Arc::clone(&store));

    let upstream =
        UpstreamClient::new(config.upstream_auth_url.clone(), config.upstream_api_url.clone())?;
    let listen_addr = config.listen_addr.clone();
    let state = AppState::new(config, store, upstream);

    let server = RelayServer::start(&listen_addr, state).await?;

    tokio::signal::ctrl_c().await?;
    warn!("interrupt received, shutting down");

    server.shutdown().await?;
    Ok(())
}

/// Periodically drop expired correlation entries so abandoned attempts
/// cannot grow the map without bound
fn spawn_eviction_sweep(store: Arc<InMemoryCorrelationStore>) {
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(Duration::from_secs(CORRELATION_SWEEP_INTERVAL_SECS));
        loop {
            interval.tick().await;
            store.purge_expired();
        }
    });
}
