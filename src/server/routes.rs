//! Router configuration for the web server.

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;

use super::handlers;
use super::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Server-rendered link preview
        .route("/drop/:token", get(handlers::drop_preview))
        .route("/drop/:token/download", get(handlers::drop_download))
        .route("/drop/:token/stream", get(handlers::drop_stream))
        // Same-origin proxies for the share server
        .route("/api/list-proxy/:token", get(handlers::list_proxy))
        .route("/api/share-proxy/:token", get(handlers::share_proxy))
        .route("/healthz", get(handlers::healthz))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
