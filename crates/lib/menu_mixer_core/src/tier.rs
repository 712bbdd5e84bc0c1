//! Service tiers and their fixed limits.
//!
//! The limits table is code-level configuration: an invite code only records
//! which tier it maps to, never its own limits.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Sentinel limit value meaning "no ceiling".
pub const UNLIMITED: i64 = -1;

/// A named service level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    Pro,
    Beta,
}

/// Limits attached to a tier. `UNLIMITED` (-1) disables a ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierLimits {
    pub max_recipes: i64,
    pub monthly_ai_calls: i64,
    /// Reserved; not enforced by the gateway.
    pub requests_per_minute: i64,
}

impl TierLimits {
    /// Whether monthly AI calls are uncapped for this tier.
    pub fn has_unlimited_ai_calls(&self) -> bool {
        self.monthly_ai_calls == UNLIMITED
    }
}

impl Tier {
    /// All tiers, in ascending order of generosity.
    pub const ALL: [Tier; 3] = [Tier::Free, Tier::Pro, Tier::Beta];

    /// Fixed limits for this tier.
    pub const fn limits(self) -> TierLimits {
        match self {
            Tier::Free => TierLimits {
                max_recipes: 20,
                monthly_ai_calls: 50,
                requests_per_minute: 10,
            },
            Tier::Pro => TierLimits {
                max_recipes: UNLIMITED,
                monthly_ai_calls: 500,
                requests_per_minute: 30,
            },
            Tier::Beta => TierLimits {
                max_recipes: UNLIMITED,
                monthly_ai_calls: UNLIMITED,
                requests_per_minute: 60,
            },
        }
    }

    /// Lowercase wire/storage name.
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Pro => "pro",
            Tier::Beta => "beta",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown tier name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tier: {0}")]
pub struct UnknownTier(pub String);

impl FromStr for Tier {
    type Err = UnknownTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(Tier::Free),
            "pro" => Ok(Tier::Pro),
            "beta" => Ok(Tier::Beta),
            _ => Err(UnknownTier(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_tier_limits() {
        let limits = Tier::Free.limits();
        assert_eq!(limits.max_recipes, 20);
        assert_eq!(limits.monthly_ai_calls, 50);
        assert!(!limits.has_unlimited_ai_calls());
    }

    #[test]
    fn pro_has_unlimited_recipes_but_capped_calls() {
        let limits = Tier::Pro.limits();
        assert_eq!(limits.max_recipes, UNLIMITED);
        assert_eq!(limits.monthly_ai_calls, 500);
    }

    #[test]
    fn beta_is_fully_unlimited() {
        let limits = Tier::Beta.limits();
        assert_eq!(limits.max_recipes, UNLIMITED);
        assert!(limits.has_unlimited_ai_calls());
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("PRO".parse::<Tier>(), Ok(Tier::Pro));
        assert_eq!(" beta ".parse::<Tier>(), Ok(Tier::Beta));
        assert!("gold".parse::<Tier>().is_err());
    }

    #[test]
    fn serde_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&Tier::Free).unwrap(), "\"free\"");
        let t: Tier = serde_json::from_str("\"beta\"").unwrap();
        assert_eq!(t, Tier::Beta);
    }

    #[test]
    fn display_matches_as_str() {
        for tier in Tier::ALL {
            assert_eq!(tier.to_string(), tier.as_str());
        }
    }
}
