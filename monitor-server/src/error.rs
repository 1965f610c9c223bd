//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;

use driftwatch_core::{IngestError, MonitorError, StoreError};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Resource errors
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    // Snapshot store errors
    #[error(transparent)]
    Storage(#[from] StoreError),

    // Source database errors
    #[error(transparent)]
    Ingestion(#[from] IngestError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Storage(err) => {
                tracing::error!("Snapshot store error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Snapshot store error occurred".to_string())
            }
            AppError::Ingestion(err) => {
                tracing::error!("Ingestion error: {}", err);
                (StatusCode::BAD_GATEWAY, err.to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<MonitorError> for AppError {
    fn from(err: MonitorError) -> Self {
        match err {
            MonitorError::Ingestion(e) => AppError::Ingestion(e),
            MonitorError::Storage { source, .. } => AppError::Storage(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftwatch_core::MonitorStep;

    #[test]
    fn test_monitor_errors_map_to_status() {
        let storage = AppError::from(MonitorError::Storage {
            step: MonitorStep::Store,
            source: StoreError::Io(std::io::Error::other("disk full")),
        });
        assert_eq!(storage.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);

        let ingestion = AppError::from(MonitorError::Ingestion(IngestError::Unreachable(
            "connection refused".into(),
        )));
        assert_eq!(ingestion.into_response().status(), StatusCode::BAD_GATEWAY);

        let missing = AppError::NotFound("Dataset 'x' is not monitored".into());
        assert_eq!(missing.into_response().status(), StatusCode::NOT_FOUND);
    }
}
