//! The API error taxonomy and its mapping to HTTP status codes

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use docket_analysis::AnalysisError;
use docket_intake::IntakeError;
use docket_store::StoreError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Error body every failing endpoint returns
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
}

/// Application error type, one variant per taxonomy class
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed request body; user-correctable
    #[error("{0}")]
    Validation(String),

    /// Missing or invalid session
    #[error("Unauthorized")]
    Unauthorized,

    /// Referenced entity absent
    #[error("{0}")]
    NotFound(String),

    /// File content unusable; user must re-upload
    #[error("{0}")]
    Unreadable(String),

    /// The model could not produce a usable analysis
    #[error("analysis failed: {0}")]
    Analysis(String),

    /// Anything else
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) | ApiError::Unreadable(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Analysis(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(status = %status, error = %self, "request failed");
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(what) => ApiError::NotFound(what),
            StoreError::UsernameTaken(_) => {
                ApiError::Validation("Username already exists".to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<AnalysisError> for ApiError {
    fn from(e: AnalysisError) -> Self {
        ApiError::Analysis(e.to_string())
    }
}

impl From<IntakeError> for ApiError {
    fn from(e: IntakeError) -> Self {
        match e {
            IntakeError::EmptyBatch => ApiError::Validation("No files uploaded".to_string()),
            IntakeError::CaseNotFound(id) => ApiError::NotFound(format!("case {id}")),
            IntakeError::UnreadableDocument(file_name) => ApiError::Unreadable(format!(
                "Could not extract text from {file_name}. Please ensure the document \
                 contains readable text."
            )),
            IntakeError::Extraction { file_name, source } => {
                ApiError::Unreadable(format!("Failed to process {file_name}: {source}"))
            }
            IntakeError::Analysis(e) => e.into(),
            IntakeError::Store(e) => e.into(),
            IntakeError::Blob(e) => ApiError::Internal(e.to_string()),
            IntakeError::StoreLock => ApiError::Internal("store lock poisoned".to_string()),
        }
    }
}
