//! Error handling utilities for route handlers

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Handler-level error rendered as `{ "error": message }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// The message is the public one; details are logged where the error
    /// is created.
    #[error("{0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Extension trait for logging errors and converting to AppError
pub trait LogErr<T> {
    /// Log error with context and return a 500 carrying `public_message`
    fn log_500(self, context: &str, public_message: &str) -> Result<T, AppError>;
}

impl<T, E: std::fmt::Display> LogErr<T> for Result<T, E> {
    fn log_500(self, context: &str, public_message: &str) -> Result<T, AppError> {
        self.map_err(|e| {
            tracing::error!(error = %e, "{}", context);
            AppError::Internal(public_message.to_string())
        })
    }
}

/// Fallback for unmatched routes
pub async fn route_not_found() -> AppError {
    AppError::not_found("Route not found")
}
