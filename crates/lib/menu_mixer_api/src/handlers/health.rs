//! Liveness endpoint and the catch-all fallback.

use axum::Json;

use crate::error::AppError;
use crate::models::HealthResponse;

/// `GET /` and `GET /health`.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: menu_mixer_core::version().to_string(),
    })
}

/// Any route or method not matched above.
pub async fn not_found() -> AppError {
    AppError::NotFound
}
