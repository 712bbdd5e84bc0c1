//! JWT token generation and verification.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use tracing::{info, warn};

use super::AuthError;
use crate::models::auth::TokenClaims;
use crate::tier::Tier;

/// Bearer token lifetime: 30 days.
pub const TOKEN_EXPIRY_DAYS: i64 = 30;

/// Sign `claims` into a compact HS256 token.
pub fn issue_token(claims: &TokenClaims, secret: &[u8]) -> Result<String, AuthError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| AuthError::TokenError(format!("jwt encode: {e}")))
}

/// Mint a 30-day token for `subject` issued at `now`.
pub fn mint_token_at(
    subject: &str,
    tier: Tier,
    secret: &[u8],
    now: DateTime<Utc>,
) -> Result<(String, TokenClaims), AuthError> {
    let claims = TokenClaims {
        sub: subject.to_string(),
        tier,
        iat: now.timestamp(),
        exp: (now + Duration::days(TOKEN_EXPIRY_DAYS)).timestamp(),
    };
    let token = issue_token(&claims, secret)?;
    Ok((token, claims))
}

/// Mint a 30-day token for `subject` issued now.
pub fn mint_token(
    subject: &str,
    tier: Tier,
    secret: &[u8],
) -> Result<(String, TokenClaims), AuthError> {
    mint_token_at(subject, tier, secret, Utc::now())
}

/// Verify a token, returning the claims on success.
///
/// Any malformed, tampered, or expired token yields `None`.
pub fn verify_token(token: &str, secret: &[u8]) -> Option<TokenClaims> {
    let key = DecodingKey::from_secret(secret);
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;
    let claims = decode::<TokenClaims>(token, &key, &validation)
        .ok()
        .map(|data| data.claims)?;
    // The library accepts `exp == now`; a token must expire strictly in the future.
    (claims.exp > Utc::now().timestamp()).then_some(claims)
}

/// Resolve the signing secret: env var `JWT_SECRET` → persisted file.
pub fn resolve_jwt_secret() -> String {
    secret_from(std::env::var("JWT_SECRET").ok(), &jwt_secret_path())
}

/// Use `from_env` when non-empty, else the secret stored at `path`, else a
/// freshly generated one written to `path`.
fn secret_from(from_env: Option<String>, path: &Path) -> String {
    if let Some(secret) = from_env
        && !secret.is_empty()
    {
        return secret;
    }
    if let Ok(existing) = std::fs::read_to_string(path) {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    let secret: String = rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    match std::fs::write(path, &secret) {
        Ok(()) => info!(path = %path.display(), "generated new JWT secret"),
        Err(e) => warn!(path = %path.display(), "could not persist JWT secret: {e}"),
    }
    secret
}

/// Path to the persisted JWT secret file.
fn jwt_secret_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("menu-mixer")
        .join("jwt-secret")
}
