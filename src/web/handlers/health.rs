use axum::{Json, extract::State};
use serde::Serialize;

use crate::web::{AppState, responses::ApiResponse};

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub channels: usize,
    pub stream_routes: usize,
    pub cached_responses: usize,
    pub uptime_seconds: u64,
}

/// `GET /health`
pub async fn health_check(State(state): State<AppState>) -> Json<ApiResponse<HealthStatus>> {
    Json(ApiResponse::success(HealthStatus {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        channels: state.catalog.len(),
        stream_routes: state.routes.len(),
        cached_responses: state.cache.len().await,
        uptime_seconds: state.start_time.elapsed().as_secs(),
    }))
}
