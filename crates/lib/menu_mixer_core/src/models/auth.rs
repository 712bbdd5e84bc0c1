//! Authentication domain models.

use serde::{Deserialize, Serialize};

use crate::tier::Tier;

/// JWT claims embedded in bearer tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject, the invite code hash (standard JWT `sub` claim).
    pub sub: String,
    /// Service tier granted by the invite code.
    pub tier: Tier,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiry (unix timestamp).
    pub exp: i64,
}
