//! PostgreSQL store.
//!
//! Usage increments are a single upsert, so concurrent calls for the same
//! identity never lose updates.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;

use super::{InviteStore, StoreError, UsageStore};
use crate::models::invite::InviteCode;
use crate::models::usage::{UsageKey, UsageRecord};

type InviteRow = (
    String,
    String,
    bool,
    Option<DateTime<Utc>>,
    Option<String>,
    Option<String>,
    DateTime<Utc>,
);

/// Invite and usage store on a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn invite_from_row(row: InviteRow) -> Result<InviteCode, StoreError> {
    let (code_hash, tier, is_active, expires_at, starter_pack_id, note, created_at) = row;
    let tier = tier.parse().map_err(|e| StoreError::Corrupt {
        key: code_hash.clone(),
        reason: format!("{e}"),
    })?;
    Ok(InviteCode {
        code_hash,
        tier,
        is_active,
        expires_at,
        starter_pack_id,
        note,
        created_at,
    })
}

#[async_trait]
impl InviteStore for PgStore {
    async fn get_invite(&self, code_hash: &str) -> Result<Option<InviteCode>, StoreError> {
        let row = sqlx::query_as::<_, InviteRow>(
            "SELECT code_hash, tier, is_active, expires_at, starter_pack_id, note, created_at \
             FROM invite_codes WHERE code_hash = $1",
        )
        .bind(code_hash)
        .fetch_optional(&self.pool)
        .await?;
        row.map(invite_from_row).transpose()
    }

    async fn put_invite(&self, invite: &InviteCode) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO invite_codes \
                 (code_hash, tier, is_active, expires_at, starter_pack_id, note, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (code_hash) DO UPDATE SET \
                 tier = EXCLUDED.tier, \
                 is_active = EXCLUDED.is_active, \
                 expires_at = EXCLUDED.expires_at, \
                 starter_pack_id = EXCLUDED.starter_pack_id, \
                 note = EXCLUDED.note",
        )
        .bind(&invite.code_hash)
        .bind(invite.tier.as_str())
        .bind(invite.is_active)
        .bind(invite.expires_at)
        .bind(&invite.starter_pack_id)
        .bind(&invite.note)
        .bind(invite.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl UsageStore for PgStore {
    async fn get_usage(
        &self,
        key: &UsageKey,
        now: DateTime<Utc>,
    ) -> Result<Option<UsageRecord>, StoreError> {
        let row = sqlx::query_as::<_, (i64, i64, DateTime<Utc>)>(
            "SELECT ai_calls, tokens_used, last_call FROM usage_records \
             WHERE code_hash = $1 AND month = $2 AND expires_at > $3",
        )
        .bind(&key.code_hash)
        .bind(&key.month)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(ai_calls, tokens_used, last_call)| UsageRecord {
            ai_calls,
            tokens_used,
            last_call,
        }))
    }

    async fn increment_usage(
        &self,
        key: &UsageKey,
        tokens_used: i64,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<UsageRecord, StoreError> {
        let (ai_calls, tokens_used, last_call) = sqlx::query_as::<_, (i64, i64, DateTime<Utc>)>(
            "INSERT INTO usage_records \
                 (code_hash, month, ai_calls, tokens_used, last_call, expires_at) \
             VALUES ($1, $2, 1, $3, $4, $5) \
             ON CONFLICT (code_hash, month) DO UPDATE SET \
                 ai_calls = CASE WHEN usage_records.expires_at > $4 \
                     THEN usage_records.ai_calls + 1 ELSE 1 END, \
                 tokens_used = CASE WHEN usage_records.expires_at > $4 \
                     THEN usage_records.tokens_used + $3 ELSE $3 END, \
                 last_call = $4, \
                 expires_at = $5 \
             RETURNING ai_calls, tokens_used, last_call",
        )
        .bind(&key.code_hash)
        .bind(&key.month)
        .bind(tokens_used)
        .bind(now)
        .bind(now + ttl)
        .fetch_one(&self.pool)
        .await?;
        Ok(UsageRecord {
            ai_calls,
            tokens_used,
            last_call,
        })
    }

    async fn list_usage(
        &self,
        code_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<(String, UsageRecord)>, StoreError> {
        let rows = sqlx::query_as::<_, (String, i64, i64, DateTime<Utc>)>(
            "SELECT month, ai_calls, tokens_used, last_call FROM usage_records \
             WHERE code_hash = $1 AND expires_at > $2 \
             ORDER BY month DESC",
        )
        .bind(code_hash)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(month, ai_calls, tokens_used, last_call)| {
                (
                    month,
                    UsageRecord {
                        ai_calls,
                        tokens_used,
                        last_call,
                    },
                )
            })
            .collect())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM usage_records WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
