//! Storage seams for invite codes and usage counters.
//!
//! Backends are plain values injected into the registry and ledger; nothing
//! here is a process-wide singleton.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::models::invite::InviteCode;
use crate::models::usage::{UsageKey, UsageRecord};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Storage backend errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("Corrupt record {key}: {reason}")]
    Corrupt { key: String, reason: String },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Key-value access to provisioned invite codes, keyed by code hash.
#[async_trait]
pub trait InviteStore: Send + Sync {
    /// Fetch the invite stored under `code_hash`.
    async fn get_invite(&self, code_hash: &str) -> Result<Option<InviteCode>, StoreError>;

    /// Insert or replace an invite record.
    async fn put_invite(&self, invite: &InviteCode) -> Result<(), StoreError>;
}

/// Key-value access to monthly usage counters.
#[async_trait]
pub trait UsageStore: Send + Sync {
    /// Fetch a counter, treating entries whose TTL has lapsed by `now` as absent.
    async fn get_usage(
        &self,
        key: &UsageKey,
        now: DateTime<Utc>,
    ) -> Result<Option<UsageRecord>, StoreError>;

    /// Atomically add one call and `tokens_used` to a counter, creating it if
    /// absent, and renew its TTL to `now + ttl`.
    async fn increment_usage(
        &self,
        key: &UsageKey,
        tokens_used: i64,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<UsageRecord, StoreError>;

    /// All live counters for one identity, newest month first.
    async fn list_usage(
        &self,
        code_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<(String, UsageRecord)>, StoreError>;

    /// Drop counters whose TTL has lapsed. Returns the number removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError>;
}
