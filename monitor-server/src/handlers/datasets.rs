//! Dataset handlers - stored profiles, thresholds and breaches

use axum::{extract::{State, Path}, Json};
use serde::Serialize;

use driftwatch_core::{Breach, ColumnProfile, DatasetSource, DatasetSummary, ThresholdRecord};

use crate::{AppState, AppResult};

#[derive(Debug, Serialize)]
pub struct DatasetInfo {
    pub name: String,
    pub table: String,
    /// Empty = every column
    pub columns: Vec<String>,
}

/// List configured datasets
pub async fn list<S: DatasetSource + 'static>(
    State(state): State<AppState<S>>,
) -> Json<Vec<DatasetInfo>> {
    let config = state.monitor().config();
    let datasets = config
        .datasets
        .iter()
        .map(|d| DatasetInfo {
            name: d.dataset_name(&config.schema),
            table: d.table.clone(),
            columns: d.columns.clone(),
        })
        .collect();

    Json(datasets)
}

/// Latest profile of every monitored column
pub async fn latest<S: DatasetSource + 'static>(
    State(state): State<AppState<S>>,
    Path(name): Path<String>,
) -> AppResult<Json<Vec<ColumnProfile>>> {
    let dataset = state.resolve(&name)?;
    let profiles = state.monitor().store().query_latest(&name, &dataset.columns)?;
    Ok(Json(profiles))
}

/// Live thresholds
pub async fn thresholds<S: DatasetSource + 'static>(
    State(state): State<AppState<S>>,
    Path(name): Path<String>,
) -> AppResult<Json<Vec<ThresholdRecord>>> {
    state.resolve(&name)?;
    let records = state.monitor().store().thresholds(&name)?;
    Ok(Json(records))
}

/// Latest profiles checked against the live thresholds
pub async fn breaches<S: DatasetSource + 'static>(
    State(state): State<AppState<S>>,
    Path(name): Path<String>,
) -> AppResult<Json<Vec<Breach>>> {
    state.resolve(&name)?;
    let breaches = state.monitor().check(&name)?;
    Ok(Json(breaches))
}

/// Run the pipeline for this dataset only
pub async fn run<S: DatasetSource + 'static>(
    State(state): State<AppState<S>>,
    Path(name): Path<String>,
) -> AppResult<Json<DatasetSummary>> {
    let dataset = state.resolve(&name)?;
    let summary = state.monitor().run_dataset(dataset).await?;
    Ok(Json(summary))
}
