use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::sync::Arc;

use crate::pipeline::IngestError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Shared by every request waiting on the same cache load
    #[error("Ingestion error: {0}")]
    Ingest(#[from] Arc<IngestError>),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<IngestError> for AppError {
    fn from(e: IngestError) -> Self {
        Self::Ingest(Arc::new(e))
    }
}

impl AppError {
    #[must_use]
    pub fn as_ingest(&self) -> Option<&IngestError> {
        match self {
            Self::Ingest(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            Self::Ingest(e) => match e.as_ref() {
                IngestError::MissingColumn(_) | IngestError::Csv(_) => {
                    (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
                }
                IngestError::SourceNotFound(_) => (
                    StatusCode::NOT_FOUND,
                    "No dataset available. Upload a CSV to POST /api/datasets.".to_string(),
                ),
                IngestError::Io(io) => {
                    tracing::error!("Dataset I/O error: {io:?}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Failed to read dataset".to_string(),
                    )
                }
            },
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            Self::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
