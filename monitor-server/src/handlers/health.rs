//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use driftwatch_core::DatasetSource;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
    scheduler_running: bool,
    datasets: usize,
}

pub async fn check<S: DatasetSource + 'static>(
    State(state): State<AppState<S>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
        scheduler_running: state.scheduler.is_running(),
        datasets: state.monitor().config().datasets.len(),
    })
}
