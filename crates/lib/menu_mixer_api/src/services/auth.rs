//! Authentication service: invite validation, token refresh and usage
//! reporting.
//!
//! Every rejection of an invite code produces the same message so callers
//! cannot discover which codes exist.

use chrono::Utc;
use menu_mixer_core::auth::jwt::mint_token_at;
use menu_mixer_core::invite::hash_invite_code;
use menu_mixer_core::models::auth::TokenClaims;
use menu_mixer_core::models::invite::InviteRejection;
use menu_mixer_core::tier::{Tier, UNLIMITED};
use tracing::info;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{LimitsSnapshot, TokenResponse, UsageResponse, format_timestamp};

const INVALID_INVITE: &str = "Invalid invite code";

fn invalid_invite() -> AppError {
    AppError::Unauthorized(INVALID_INVITE.into())
}

fn limits_snapshot(tier: Tier, remaining: i64) -> LimitsSnapshot {
    let limits = tier.limits();
    LimitsSnapshot {
        max_recipes: limits.max_recipes,
        max_ai_calls: limits.monthly_ai_calls,
        remaining_ai_calls: remaining,
    }
}

/// Exchange a raw invite code for a 30-day token.
pub async fn validate(state: &AppState, invite_code: Option<&str>) -> AppResult<TokenResponse> {
    let raw = invite_code
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Invite code required".into()))?;

    let code_hash = hash_invite_code(raw);
    let invite = state
        .invites
        .lookup(&code_hash)
        .await?
        .ok_or_else(invalid_invite)?;

    let now = Utc::now();
    if let Err(rejection) = invite.admit(now) {
        let reason = match rejection {
            InviteRejection::Inactive => "inactive",
            InviteRejection::Expired => "expired",
        };
        info!(reason, "invite code rejected");
        return Err(invalid_invite());
    }

    let (token, _) = mint_token_at(
        &code_hash,
        invite.tier,
        state.config.jwt_secret.as_bytes(),
        now,
    )?;
    let quota = state.ledger.check(&code_hash, invite.tier, now).await?;

    info!(tier = %invite.tier, "invite code accepted");
    Ok(TokenResponse {
        success: true,
        token,
        tier: invite.tier,
        limits: limits_snapshot(invite.tier, quota.remaining),
        starter_pack_id: invite.starter_pack_id,
    })
}

/// Mint a replacement token for already-verified claims.
///
/// The invite registry is not consulted: a token issued before its code was
/// deactivated can still be refreshed.
pub async fn refresh(state: &AppState, claims: &TokenClaims) -> AppResult<TokenResponse> {
    let now = Utc::now();
    let (token, _) = mint_token_at(
        &claims.sub,
        claims.tier,
        state.config.jwt_secret.as_bytes(),
        now,
    )?;
    let quota = state.ledger.check(&claims.sub, claims.tier, now).await?;

    Ok(TokenResponse {
        success: true,
        token,
        tier: claims.tier,
        limits: limits_snapshot(claims.tier, quota.remaining),
        starter_pack_id: None,
    })
}

/// Report this month's usage for display. Never mutates the ledger.
pub async fn usage(state: &AppState, claims: &TokenClaims) -> AppResult<UsageResponse> {
    let now = Utc::now();
    let limit = claims.tier.limits().monthly_ai_calls;
    let quota = state.ledger.check(&claims.sub, claims.tier, now).await?;

    let monthly_ai_calls = if limit == UNLIMITED {
        state.ledger.calls_in_month(&claims.sub, now).await?
    } else {
        limit - quota.remaining
    };

    Ok(UsageResponse {
        tier: claims.tier,
        monthly_ai_calls,
        monthly_limit: limit,
        remaining_calls: quota.remaining,
        reset_at: format_timestamp(quota.reset_at),
    })
}
