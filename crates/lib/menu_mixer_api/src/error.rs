//! Application error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::error;

use crate::models::{ErrorResponse, format_timestamp};

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Rate limit exceeded")]
    QuotaExceeded {
        remaining: i64,
        reset_at: DateTime<Utc>,
    },

    #[error("Not found")]
    NotFound,

    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(m) => (StatusCode::BAD_REQUEST, "validation_error", m.as_str()),
            AppError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, "unauthorized", m.as_str()),
            AppError::QuotaExceeded { .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                "Rate limit exceeded",
            ),
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found", "Not found"),
            AppError::Internal(detail) => {
                error!(%detail, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error",
                )
            }
        };
        let (remaining, reset_at) = match &self {
            AppError::QuotaExceeded {
                remaining,
                reset_at,
            } => (
                Some(*remaining),
                Some(format_timestamp(*reset_at)),
            ),
            _ => (None, None),
        };
        let body = Json(ErrorResponse {
            success: false,
            error: message.to_string(),
            code: code.to_string(),
            remaining,
            reset_at,
        });
        (status, body).into_response()
    }
}

impl From<menu_mixer_core::store::StoreError> for AppError {
    fn from(e: menu_mixer_core::store::StoreError) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<menu_mixer_core::auth::AuthError> for AppError {
    fn from(e: menu_mixer_core::auth::AuthError) -> Self {
        // Minting failures are server-side; verification failures never reach here.
        AppError::Internal(e.to_string())
    }
}

impl From<menu_mixer_core::ai::AiError> for AppError {
    fn from(e: menu_mixer_core::ai::AiError) -> Self {
        AppError::Internal(e.to_string())
    }
}
