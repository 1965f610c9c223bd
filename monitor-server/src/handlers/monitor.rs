//! Monitor handlers - cycle runs and scheduler lifecycle

use std::time::Duration;

use axum::{extract::{State, Query}, Json};
use serde::Deserialize;

use driftwatch_core::{CycleReport, DatasetSource, SchedulerStatus};

use crate::{AppState, AppResult, AppError};

#[derive(Debug, Deserialize)]
pub struct StartQuery {
    /// Overrides the configured interval
    pub interval_secs: Option<u64>,
}

/// Run one cycle over every configured dataset now
pub async fn run<S: DatasetSource + 'static>(
    State(state): State<AppState<S>>,
) -> Json<CycleReport> {
    Json(state.scheduler.run_now().await)
}

/// Scheduler state and last cycle report
pub async fn status<S: DatasetSource + 'static>(
    State(state): State<AppState<S>>,
) -> Json<SchedulerStatus> {
    Json(state.scheduler.status())
}

/// Start periodic monitoring
pub async fn start<S: DatasetSource + 'static>(
    State(state): State<AppState<S>>,
    Query(query): Query<StartQuery>,
) -> AppResult<Json<SchedulerStatus>> {
    let interval = match query.interval_secs {
        Some(secs) => Duration::from_secs(secs.max(1)),
        None => state.monitor().config().interval(),
    };

    if !state.scheduler.start(interval) {
        return Err(AppError::Conflict("Scheduler already running".to_string()));
    }

    tracing::info!("Scheduler started via API (every {}s)", interval.as_secs());
    Ok(Json(state.scheduler.status()))
}

/// Stop periodic monitoring, letting a running cycle finish
pub async fn stop<S: DatasetSource + 'static>(
    State(state): State<AppState<S>>,
) -> AppResult<Json<SchedulerStatus>> {
    if !state.scheduler.stop().await {
        return Err(AppError::Conflict("Scheduler not running".to_string()));
    }

    tracing::info!("Scheduler stopped via API");
    Ok(Json(state.scheduler.status()))
}
