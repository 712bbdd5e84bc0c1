//! Bearer token authentication.
//!
//! Tokens are self-contained HS256 JWTs; nothing about a session is stored
//! server-side.

pub mod jwt;

use thiserror::Error;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token error: {0}")]
    TokenError(String),
}
