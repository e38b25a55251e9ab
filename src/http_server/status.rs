//! Represents the `/status` endpoint handler and response structure.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;

use super::ApiState;
use crate::engine::BatcherStats;

/// Represents the response from the `/status` endpoint.
#[derive(Debug, Serialize, Clone)]
pub struct StatusResponse {
    /// The version of the application.
    pub version: String,
    /// The uptime of the application in seconds.
    pub uptime_secs: u64,
    /// Live batch state and lifetime counters.
    #[serde(flatten)]
    pub batcher: BatcherStats,
}

/// Retrieves application status and batcher statistics.
pub async fn status(State(state): State<ApiState>) -> impl IntoResponse {
    let response = StatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        batcher: state.batcher.stats().await,
    };
    (StatusCode::OK, Json(response))
}
