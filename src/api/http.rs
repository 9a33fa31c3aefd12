//! HTTP server setup with Axum

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use super::rest::{globals, stats};
use super::websocket::{handler::ws_handler, registry::HubRegistry, state::AppState};
use crate::store::SharedStore;

/// Create the Axum router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS configuration - the dashboard may be served from anywhere
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // WebSocket endpoint
        .route("/ws", get(ws_handler))
        // Health check
        .route("/health", get(health_check))
        // REST API endpoints
        .route("/api/stats", get(stats::get_stats))
        .route("/api/globals", get(globals::list_globals))
        .route("/api/hofs", get(globals::list_hofs))
        .layer(cors)
        .with_state(state)
}

/// Serve the API on `port` until `shutdown` is cancelled.
///
/// The port's hub is taken from the registry (so a watcher started earlier
/// reaches these connections) and unregistered again on shutdown.
pub async fn serve(
    port: u16,
    store: SharedStore,
    registry: Arc<HubRegistry>,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let hub = registry.get_or_create(port);
    let app = create_router(Arc::new(AppState::new(store, Arc::clone(&hub))));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "web server listening");

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await;

    registry.unregister(port);
    hub.close_all().await;
    info!(port, "web server stopped");

    result
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
