//! Router assembly and the HTTP accept loop.

use crate::api::{admin, app};
use crate::shutdown::shutdown_signal;
use crate::state::AppState;
use axum::{Json, Router, response::IntoResponse, routing::get};
use serde_json::json;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Assemble the full route tree: client API under `/api`, corrective tooling
/// under `/admin`, and an unauthenticated liveness probe.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api", app::router())
        .nest("/admin", admin::router())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Serve until a termination signal arrives, then finish in-flight requests.
pub async fn run_server(router: Router, addr: SocketAddr) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Accepting connections");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}
