//! HTTP server module
//!
//! Exposes a liveness probe and the batcher's live statistics.

mod error;
mod status;

use std::{net::SocketAddr, time::Instant};

use axum::{Json, Router, response::IntoResponse, routing::get};
use serde_json::json;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

pub use error::ServerError;
pub use status::StatusResponse;

use crate::engine::AlertBatcher;

/// State shared by the request handlers.
#[derive(Clone)]
pub struct ApiState {
    batcher: AlertBatcher,
    started_at: Instant,
}

impl ApiState {
    /// Creates the handler state for `batcher`, counting uptime from now.
    pub fn new(batcher: AlertBatcher) -> Self {
        Self { batcher, started_at: Instant::now() }
    }
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Builds the router with all routes attached.
pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/status", get(status::status))
        .with_state(state)
}

/// Serves on an already bound listener until `cancellation` fires.
pub async fn serve(
    listener: TcpListener,
    batcher: AlertBatcher,
    cancellation: CancellationToken,
) -> Result<(), ServerError> {
    let app = router(ApiState::new(batcher));
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async move { cancellation.cancelled().await })
        .await?;
    Ok(())
}

/// Binds `listen_address` and serves until `cancellation` fires.
pub async fn run_server(
    listen_address: &str,
    batcher: AlertBatcher,
    cancellation: CancellationToken,
) -> Result<(), ServerError> {
    let addr: SocketAddr = listen_address
        .parse()
        .map_err(|e| ServerError::InvalidAddress(listen_address.to_string(), e))?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(address = %addr, "HTTP server listening.");
    serve(listener, batcher, cancellation).await
}
