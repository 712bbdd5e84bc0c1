//! Usage ledger: monthly quota per identity.
//!
//! Counters are keyed by `(code_hash, YYYY-MM)` in server UTC time; a new
//! month starts from zero since its key has no record yet.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};

use crate::models::usage::{QuotaStatus, UsageKey, UsageRecord};
use crate::store::{StoreError, UsageStore};
use crate::tier::{Tier, UNLIMITED};

/// Counters are evicted this long after their last write.
pub const USAGE_TTL_DAYS: i64 = 60;

/// First instant (UTC) of the month following `now`.
pub fn next_month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(now.year(), now.month(), 1)
        .and_then(|first| first.checked_add_months(Months::new(1)))
        .and_then(|first| first.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or(now)
}

/// Quota checks and usage recording over an injected store.
#[derive(Clone)]
pub struct UsageLedger {
    store: Arc<dyn UsageStore>,
}

impl UsageLedger {
    pub fn new(store: Arc<dyn UsageStore>) -> Self {
        Self { store }
    }

    /// Remaining monthly quota for `code_hash` at `now`.
    ///
    /// Unlimited tiers are always allowed and never touch the store.
    pub async fn check(
        &self,
        code_hash: &str,
        tier: Tier,
        now: DateTime<Utc>,
    ) -> Result<QuotaStatus, StoreError> {
        let reset_at = next_month_start(now);
        let limits = tier.limits();
        if limits.has_unlimited_ai_calls() {
            return Ok(QuotaStatus {
                allowed: true,
                remaining: UNLIMITED,
                reset_at,
            });
        }

        let used = self.calls_in_month(code_hash, now).await?;
        let remaining = (limits.monthly_ai_calls - used).max(0);
        Ok(QuotaStatus {
            allowed: remaining > 0,
            remaining,
            reset_at,
        })
    }

    /// Record one billable call and the provider tokens it consumed.
    pub async fn record(
        &self,
        code_hash: &str,
        tokens_used: i64,
        now: DateTime<Utc>,
    ) -> Result<UsageRecord, StoreError> {
        let key = UsageKey::for_month(code_hash, now);
        self.store
            .increment_usage(&key, tokens_used, now, Duration::days(USAGE_TTL_DAYS))
            .await
    }

    /// Calls recorded for `code_hash` in the month containing `now`.
    pub async fn calls_in_month(
        &self,
        code_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        let key = UsageKey::for_month(code_hash, now);
        Ok(self
            .store
            .get_usage(&key, now)
            .await?
            .map_or(0, |record| record.ai_calls))
    }

    /// Live monthly records for `code_hash`, newest first.
    pub async fn history(
        &self,
        code_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<(String, UsageRecord)>, StoreError> {
        self.store.list_usage(code_hash, now).await
    }

    /// Drop counters whose TTL has lapsed.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        self.store.purge_expired(now).await
    }
}
