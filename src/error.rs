use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Errors raised inside a single simulated fetch attempt: injected faults,
/// store validation failures and missing records. These never cross the
/// service boundary directly; they are translated into [`AppError`] once the
/// retry sequence has finished.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("network error: status {status}")]
    Network { status: u16 },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("course not found")]
    NotFound,

    #[error("internal error: {0}")]
    Internal(String),
}

/// Errors crossing the public API boundary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Service temporarily unavailable (status {0})")]
    Unavailable(u16),

    #[error("Not found")]
    NotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error")]
    InternalServerError,
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Network { status } => AppError::Unavailable(status),
            FetchError::Validation(msg) => AppError::BadRequest(msg),
            FetchError::NotFound => AppError::NotFound,
            FetchError::Internal(msg) => {
                error!("unexpected fetch error: {}", msg);
                AppError::InternalServerError
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Unavailable(code) => (
                StatusCode::SERVICE_UNAVAILABLE,
                format!("Network error: the course service returned status {}", code),
            ),
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not Found".to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(ErrorResponse {
            error: status.to_string(),
            message: error_message,
        });

        (status, body).into_response()
    }
}
