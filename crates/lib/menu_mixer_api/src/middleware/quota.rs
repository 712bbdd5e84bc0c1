//! Monthly quota guard for billable routes.
//!
//! Runs after [`require_auth`](super::auth::require_auth). It only checks;
//! the handler records usage once the provider call has succeeded.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use tracing::info;

use super::auth::AuthenticatedUser;
use crate::AppState;
use crate::error::AppError;

/// Quota left when the request was admitted, stored in request extensions.
#[derive(Debug, Clone, Copy)]
pub struct QuotaGrant {
    /// Calls left before this one, or -1 for unlimited tiers.
    pub remaining: i64,
    pub reset_at: DateTime<Utc>,
}

impl QuotaGrant {
    /// Calls left once the current request has been recorded.
    pub fn remaining_after_call(&self) -> i64 {
        if self.remaining < 0 {
            self.remaining
        } else {
            (self.remaining - 1).max(0)
        }
    }
}

/// Axum middleware: rejects with 429 when the caller's monthly quota is spent,
/// otherwise injects a [`QuotaGrant`].
pub async fn require_quota(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let AuthenticatedUser(claims) = request
        .extensions()
        .get::<AuthenticatedUser>()
        .cloned()
        .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".into()))?;

    let status = state
        .ledger
        .check(&claims.sub, claims.tier, Utc::now())
        .await?;

    if !status.allowed {
        info!(tier = %claims.tier, reset_at = %status.reset_at, "monthly quota exhausted");
        return Err(AppError::QuotaExceeded {
            remaining: status.remaining,
            reset_at: status.reset_at,
        });
    }

    request.extensions_mut().insert(QuotaGrant {
        remaining: status.remaining,
        reset_at: status.reset_at,
    });
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant(remaining: i64) -> QuotaGrant {
        QuotaGrant {
            remaining,
            reset_at: Utc::now(),
        }
    }

    #[test]
    fn remaining_after_call_decrements() {
        assert_eq!(grant(50).remaining_after_call(), 49);
        assert_eq!(grant(1).remaining_after_call(), 0);
    }

    #[test]
    fn unlimited_stays_unlimited() {
        assert_eq!(grant(-1).remaining_after_call(), -1);
    }
}
