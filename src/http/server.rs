//! HTTP server setup and management

use std::net::SocketAddr;

use axum::http::Method;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::gate::require_access;
use super::handlers::{earthquakes, geomagnetic, health, lightning, seismic, status, unlock};
use super::state::AppState;

/// Builds the API router over `state`
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_origin(Any);

    Router::new()
        .route("/api/earthquakes", get(earthquakes))
        .route("/api/geomagnetic", get(geomagnetic))
        .route("/api/lightning", get(lightning))
        .route("/api/seismic", get(seismic))
        .route("/api/status", get(status))
        .route("/api/health", get(health))
        .route("/api/unlock", post(unlock))
        .layer(middleware::from_fn_with_state(state.clone(), require_access))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the API on `addr` until Ctrl-C
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let gated = state.gate.is_enabled();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(gated, "vitalsigns listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
