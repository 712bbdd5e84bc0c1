//! AI service: validates requests, calls the provider and records usage.
//!
//! Usage is recorded only once a response is ready to send. A provider
//! failure or undecodable provider output records nothing.

use chrono::Utc;
use menu_mixer_core::ai::decode::{decode_analysis, decode_json_array};
use menu_mixer_core::ai::prompts::{self, OptimizeKind, SourceKind};
use menu_mixer_core::ai::recipe::{ParsedRecipe, ThemedRecipe};
use menu_mixer_core::ai::Completion;
use menu_mixer_core::models::auth::TokenClaims;
use tracing::debug;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::quota::QuotaGrant;
use crate::models::{
    ChatRequest, ChatResponse, OptimizeRequest, OptimizeResponse, ParseRequest, ParseResponse,
    ThemeRequest, ThemeResponse,
};

/// Record one billable call for `claims.sub`.
async fn charge(
    state: &AppState,
    claims: &TokenClaims,
    completion: &Completion,
) -> AppResult<()> {
    state
        .ledger
        .record(&claims.sub, completion.tokens_used, Utc::now())
        .await?;
    debug!(tokens = completion.tokens_used, "billable call recorded");
    Ok(())
}

fn non_empty<T>(items: Option<Vec<T>>) -> Option<Vec<T>> {
    items.filter(|v| !v.is_empty())
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty())
}

/// Extract recipes from text, an image, or a PDF.
pub async fn parse(
    state: &AppState,
    claims: &TokenClaims,
    grant: QuotaGrant,
    req: ParseRequest,
) -> AppResult<ParseResponse> {
    let content = non_blank(req.content)
        .ok_or_else(|| AppError::Validation("Content is required".into()))?;

    let messages = match SourceKind::from_label(req.content_type.as_deref()) {
        SourceKind::Text => prompts::parse_text(&content),
        kind => prompts::parse_document(kind, &content),
    };
    let completion = state.provider.complete(messages).await?;
    let recipes: Vec<ParsedRecipe> = decode_json_array(&completion.content)?;
    charge(state, claims, &completion).await?;

    Ok(ParseResponse {
        recipes,
        remaining: grant.remaining_after_call(),
    })
}

/// Run one of the menu analyses.
pub async fn optimize(
    state: &AppState,
    claims: &TokenClaims,
    grant: QuotaGrant,
    req: OptimizeRequest,
) -> AppResult<OptimizeResponse> {
    let (Some(kind), Some(recipes)) = (non_blank(req.kind), non_empty(req.recipes)) else {
        return Err(AppError::Validation("Type and recipes are required".into()));
    };

    let messages = prompts::optimize(OptimizeKind::from_label(&kind), &recipes);
    let completion = state.provider.complete(messages).await?;
    let result = decode_analysis(&completion.content);
    charge(state, claims, &completion).await?;

    Ok(OptimizeResponse {
        result,
        remaining: grant.remaining_after_call(),
    })
}

/// Re-theme recipe names and descriptions.
pub async fn theme(
    state: &AppState,
    claims: &TokenClaims,
    grant: QuotaGrant,
    req: ThemeRequest,
) -> AppResult<ThemeResponse> {
    let (Some(recipes), Some(theme)) = (non_empty(req.recipes), non_blank(req.theme)) else {
        return Err(AppError::Validation("Recipes and theme are required".into()));
    };

    let completion = state
        .provider
        .complete(prompts::theme(&recipes, &theme))
        .await?;
    let themed_recipes: Vec<ThemedRecipe> = decode_json_array(&completion.content)?;
    charge(state, claims, &completion).await?;

    Ok(ThemeResponse {
        themed_recipes,
        remaining: grant.remaining_after_call(),
    })
}

/// Menu assistant chat.
pub async fn chat(
    state: &AppState,
    claims: &TokenClaims,
    grant: QuotaGrant,
    req: ChatRequest,
) -> AppResult<ChatResponse> {
    let messages = non_empty(req.messages)
        .ok_or_else(|| AppError::Validation("Messages are required".into()))?;

    let completion = state
        .provider
        .complete(prompts::chat(&messages, req.context.as_ref()))
        .await?;
    charge(state, claims, &completion).await?;

    Ok(ChatResponse {
        response: completion.content,
        remaining: grant.remaining_after_call(),
    })
}
