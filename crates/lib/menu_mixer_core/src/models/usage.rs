//! Usage ledger records.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Key of a monthly usage counter: `(code_hash, "YYYY-MM")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UsageKey {
    pub code_hash: String,
    pub month: String,
}

impl UsageKey {
    /// Key for the calendar month (UTC) containing `now`.
    pub fn for_month(code_hash: &str, now: DateTime<Utc>) -> Self {
        Self {
            code_hash: code_hash.to_string(),
            month: now.format("%Y-%m").to_string(),
        }
    }
}

impl fmt::Display for UsageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.code_hash, self.month)
    }
}

/// Per-identity, per-month counter of billable calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    pub ai_calls: i64,
    /// Provider tokens consumed; informational only.
    pub tokens_used: i64,
    pub last_call: DateTime<Utc>,
}

/// Outcome of a quota check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaStatus {
    pub allowed: bool,
    /// Calls left this month, or `UNLIMITED` (-1).
    pub remaining: i64,
    /// First instant of the next UTC month.
    pub reset_at: DateTime<Utc>,
}
