//! Error types for the HTTP adapter.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tododb_core::RepoError;

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Everything a handler can fail with.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The repository rejected or failed the call.
    #[error(transparent)]
    Repo(#[from] RepoError),

    /// The body was not a JSON todo.
    #[error("Invalid request body")]
    InvalidBody,

    /// The handler itself failed, e.g. a blocking task panicked.
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    /// The status code sent for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Repo(RepoError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Repo(RepoError::InvalidInput { .. }) | Self::InvalidBody => {
                StatusCode::BAD_REQUEST
            }
            Self::Repo(RepoError::Database { .. }) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
