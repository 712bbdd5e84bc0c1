//! Invite validation and token handlers.

use axum::extract::State;
use axum::{Extension, Json};

use crate::AppState;
use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{TokenResponse, UsageResponse, ValidateRequest};
use crate::services::auth;

/// `POST /auth/validate`: exchange an invite code for a token.
pub async fn validate_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<ValidateRequest>,
) -> AppResult<Json<TokenResponse>> {
    let resp = auth::validate(&state, body.invite_code.as_deref()).await?;
    Ok(Json(resp))
}

/// `POST /auth/refresh`: mint a fresh token for the bearer.
pub async fn refresh_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(claims)): Extension<AuthenticatedUser>,
) -> AppResult<Json<TokenResponse>> {
    let resp = auth::refresh(&state, &claims).await?;
    Ok(Json(resp))
}

/// `POST /auth/usage`: this month's AI call count for the bearer.
pub async fn usage_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(claims)): Extension<AuthenticatedUser>,
) -> AppResult<Json<UsageResponse>> {
    let resp = auth::usage(&state, &claims).await?;
    Ok(Json(resp))
}
