//! In-memory store backed by `DashMap`, with TTL-based expiration of usage
//! counters.
//!
//! Suitable for development and tests; state is lost on restart.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use super::{InviteStore, StoreError, UsageStore};
use crate::models::invite::InviteCode;
use crate::models::usage::{UsageKey, UsageRecord};

/// A usage counter with expiry.
#[derive(Debug, Clone)]
struct UsageEntry {
    record: UsageRecord,
    expires_at: DateTime<Utc>,
}

/// In-memory invite and usage store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    invites: DashMap<String, InviteCode>,
    usage: DashMap<UsageKey, UsageEntry>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InviteStore for MemoryStore {
    async fn get_invite(&self, code_hash: &str) -> Result<Option<InviteCode>, StoreError> {
        Ok(self.invites.get(code_hash).map(|entry| entry.value().clone()))
    }

    async fn put_invite(&self, invite: &InviteCode) -> Result<(), StoreError> {
        self.invites
            .insert(invite.code_hash.clone(), invite.clone());
        Ok(())
    }
}

#[async_trait]
impl UsageStore for MemoryStore {
    async fn get_usage(
        &self,
        key: &UsageKey,
        now: DateTime<Utc>,
    ) -> Result<Option<UsageRecord>, StoreError> {
        Ok(self.usage.get(key).and_then(|entry| {
            if now < entry.expires_at {
                Some(entry.record.clone())
            } else {
                None
            }
        }))
    }

    async fn increment_usage(
        &self,
        key: &UsageKey,
        tokens_used: i64,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<UsageRecord, StoreError> {
        // The entry guard holds the shard lock, so read-modify-write is atomic per key.
        let mut entry = self.usage.entry(key.clone()).or_insert_with(|| UsageEntry {
            record: UsageRecord {
                ai_calls: 0,
                tokens_used: 0,
                last_call: now,
            },
            expires_at: now + ttl,
        });
        if entry.expires_at <= now {
            entry.record.ai_calls = 0;
            entry.record.tokens_used = 0;
        }
        entry.record.ai_calls += 1;
        entry.record.tokens_used += tokens_used;
        entry.record.last_call = now;
        entry.expires_at = now + ttl;
        Ok(entry.record.clone())
    }

    async fn list_usage(
        &self,
        code_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<(String, UsageRecord)>, StoreError> {
        let mut rows: Vec<(String, UsageRecord)> = self
            .usage
            .iter()
            .filter(|entry| entry.key().code_hash == code_hash && now < entry.expires_at)
            .map(|entry| (entry.key().month.clone(), entry.record.clone()))
            .collect();
        rows.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(rows)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let before = self.usage.len();
        self.usage.retain(|_, entry| now < entry.expires_at);
        Ok(before.saturating_sub(self.usage.len()) as u64)
    }
}
