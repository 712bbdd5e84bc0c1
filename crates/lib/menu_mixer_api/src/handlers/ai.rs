//! Billable AI handlers. Mounted behind both auth and quota middleware.

use axum::extract::State;
use axum::{Extension, Json};

use crate::AppState;
use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::auth::AuthenticatedUser;
use crate::middleware::quota::QuotaGrant;
use crate::models::{
    ChatRequest, ChatResponse, OptimizeRequest, OptimizeResponse, ParseRequest, ParseResponse,
    ThemeRequest, ThemeResponse,
};
use crate::services::ai;

/// `POST /ai/parse`
pub async fn parse_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(claims)): Extension<AuthenticatedUser>,
    Extension(grant): Extension<QuotaGrant>,
    AppJson(body): AppJson<ParseRequest>,
) -> AppResult<Json<ParseResponse>> {
    Ok(Json(ai::parse(&state, &claims, grant, body).await?))
}

/// `POST /ai/optimize`
pub async fn optimize_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(claims)): Extension<AuthenticatedUser>,
    Extension(grant): Extension<QuotaGrant>,
    AppJson(body): AppJson<OptimizeRequest>,
) -> AppResult<Json<OptimizeResponse>> {
    Ok(Json(ai::optimize(&state, &claims, grant, body).await?))
}

/// `POST /ai/theme`
pub async fn theme_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(claims)): Extension<AuthenticatedUser>,
    Extension(grant): Extension<QuotaGrant>,
    AppJson(body): AppJson<ThemeRequest>,
) -> AppResult<Json<ThemeResponse>> {
    Ok(Json(ai::theme(&state, &claims, grant, body).await?))
}

/// `POST /ai/chat`
pub async fn chat_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(claims)): Extension<AuthenticatedUser>,
    Extension(grant): Extension<QuotaGrant>,
    AppJson(body): AppJson<ChatRequest>,
) -> AppResult<Json<ChatResponse>> {
    Ok(Json(ai::chat(&state, &claims, grant, body).await?))
}
