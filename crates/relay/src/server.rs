//! Router construction and server lifecycle

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use larkwire_common::CorrelationStore;
use larkwire_domain::{LarkwireError, Result};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::config::RelayConfig;
use crate::handlers;
use crate::upstream::UpstreamClient;

/// Shared state injected into every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RelayConfig>,
    pub store: Arc<dyn CorrelationStore>,
    pub upstream: Arc<UpstreamClient>,
}

impl AppState {
    /// Assemble the relay state from its collaborators
    #[must_use]
    pub fn new(
        config: RelayConfig,
        store: Arc<dyn CorrelationStore>,
        upstream: UpstreamClient,
    ) -> Self {
        Self { config: Arc::new(config), store, upstream: Arc::new(upstream) }
    }
}

/// Build the relay router with permissive cross-origin headers
///
/// The CORS layer also answers `OPTIONS` preflight requests.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/start", get(handlers::start))
        .route("/callback", get(handlers::callback))
        .route("/verify", get(handlers::verify))
        .route("/timeline", get(handlers::timeline))
        .layer(cors)
        .with_state(state)
}

/// Running relay HTTP server with graceful shutdown
pub struct RelayServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl RelayServer {
    /// Bind `addr` (use port 0 for an ephemeral port) and start serving
    ///
    /// # Errors
    /// Returns `LarkwireError::Network` if the listener cannot be bound.
    pub async fn start(addr: &str, state: AppState) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| LarkwireError::Network(format!("failed to bind {addr}: {e}")))?;

        let addr = listener
            .local_addr()
            .map_err(|e| LarkwireError::Network(format!("failed to determine local addr: {e}")))?;

        let app = router(state);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let handle = tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
            {
                error!("relay server error: {err}");
            }
        });

        info!(%addr, "relay listening");

        Ok(Self { addr, shutdown_tx: Some(shutdown_tx), handle: Some(handle) })
    }

    /// Address the server is bound to
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL of the running server
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Shut the server down gracefully
    ///
    /// # Errors
    /// Returns `LarkwireError::Internal` if the serve task panicked.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                if err.is_panic() {
                    return Err(LarkwireError::Internal(format!("relay server panicked: {err}")));
                }
            }
        }

        Ok(())
    }
}

impl Drop for RelayServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if !handle.is_finished() {
                handle.abort();
            }
        }
    }
}
