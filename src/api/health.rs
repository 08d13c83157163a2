//! Health check endpoint handler.

use crate::api::AppState;
use crate::data::DatasetStatus;
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
    pub datasets: DatasetStatus,
    pub cached_charts: usize,
}

/// `healthy` with both datasets loaded, `degraded` with one, `unhealthy` with none.
pub fn health_status(datasets: &DatasetStatus) -> &'static str {
    match (datasets.contagions_loaded, datasets.vaccinations_loaded) {
        (true, true) => "healthy",
        (true, false) | (false, true) => "degraded",
        (false, false) => "unhealthy",
    }
}

/// GET /health - Return service and dataset status.
pub async fn handle(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let datasets = state.datasets.snapshot().status();

    Json(HealthResponse {
        status: health_status(&datasets).to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        datasets,
        cached_charts: state.datasets.cached_charts(),
    })
}
