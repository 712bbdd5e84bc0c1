//! Invite registry: read-only lookup from a user-supplied code to its grant.
//!
//! Codes are identified by the SHA-256 of their uppercased text. The hash is
//! the storage key and doubles as the pseudonymous identity carried in tokens.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::models::invite::InviteCode;
use crate::store::{InviteStore, StoreError};
use crate::tier::Tier;

/// Hash an invite code for storage and identity. Case-insensitive.
pub fn hash_invite_code(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.to_uppercase().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Generate a random code in `XXXX-XXXX-XXXX` form (uppercase alphanumeric).
pub fn generate_invite_code() -> String {
    let chars: Vec<char> = rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect();
    chars
        .chunks(4)
        .map(|group| group.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("-")
}

/// Parameters for provisioning a new invite code.
#[derive(Debug, Clone)]
pub struct NewInvite {
    pub code: String,
    pub tier: Tier,
    pub expires_at: Option<DateTime<Utc>>,
    pub starter_pack_id: Option<String>,
    pub note: Option<String>,
}

/// Lookup and administration of invite codes over an injected store.
#[derive(Clone)]
pub struct InviteRegistry {
    store: Arc<dyn InviteStore>,
}

impl InviteRegistry {
    pub fn new(store: Arc<dyn InviteStore>) -> Self {
        Self { store }
    }

    /// Look up an invite by code hash.
    ///
    /// A corrupt record is logged and reported as absent so callers cannot
    /// tell it apart from a code that was never provisioned.
    pub async fn lookup(&self, code_hash: &str) -> Result<Option<InviteCode>, StoreError> {
        match self.store.get_invite(code_hash).await {
            Ok(found) => Ok(found),
            Err(StoreError::Corrupt { key, reason }) => {
                warn!(code_hash = %key, %reason, "ignoring corrupt invite record");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Store a new invite code. Only the hash of `code` is persisted.
    pub async fn provision(&self, new: NewInvite) -> Result<InviteCode, StoreError> {
        let invite = InviteCode {
            code_hash: hash_invite_code(&new.code),
            tier: new.tier,
            is_active: true,
            expires_at: new.expires_at,
            starter_pack_id: new.starter_pack_id,
            note: new.note,
            created_at: Utc::now(),
        };
        self.store.put_invite(&invite).await?;
        Ok(invite)
    }

    /// Mark an invite inactive. Returns `false` if the code is unknown.
    ///
    /// Tokens already issued for the code stay valid until they expire.
    pub async fn deactivate(&self, code_hash: &str) -> Result<bool, StoreError> {
        let Some(mut invite) = self.store.get_invite(code_hash).await? else {
            return Ok(false);
        };
        invite.is_active = false;
        self.store.put_invite(&invite).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn registry() -> InviteRegistry {
        InviteRegistry::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn hash_is_case_insensitive() {
        let h = hash_invite_code("abc-123");
        assert_eq!(h, hash_invite_code("ABC-123"));
        assert_eq!(h, hash_invite_code("aBc-123"));
    }

    #[test]
    fn hash_is_lowercase_sha256_hex() {
        // sha256("ABC")
        assert_eq!(
            hash_invite_code("abc"),
            "b5d4045c3f466fa91fe2cc6abe79232a1a57cdf104f7a26e716e0a1e2789df78"
        );
    }

    #[test]
    fn different_codes_hash_differently() {
        assert_ne!(hash_invite_code("abc-123"), hash_invite_code("abc-124"));
    }

    #[test]
    fn generated_codes_have_expected_shape() {
        let code = generate_invite_code();
        assert_eq!(code.len(), 14);
        let groups: Vec<&str> = code.split('-').collect();
        assert_eq!(groups.len(), 3);
        assert!(
            groups
                .iter()
                .all(|g| g.len() == 4 && g.chars().all(|c| !c.is_ascii_lowercase()))
        );
    }

    #[tokio::test]
    async fn provision_then_lookup_by_hash() {
        let reg = registry();
        let invite = reg
            .provision(NewInvite {
                code: "Welcome-2026".into(),
                tier: Tier::Free,
                expires_at: None,
                starter_pack_id: Some("cafe-basics".into()),
                note: None,
            })
            .await
            .unwrap();
        assert!(invite.is_active);
        let found = reg
            .lookup(&hash_invite_code("WELCOME-2026"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.tier, Tier::Free);
        assert_eq!(found.starter_pack_id.as_deref(), Some("cafe-basics"));
    }

    #[tokio::test]
    async fn unknown_code_is_absent() {
        let reg = registry();
        assert!(reg.lookup(&hash_invite_code("nope")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn deactivate_flips_active_flag() {
        let reg = registry();
        reg.provision(NewInvite {
            code: "x".into(),
            tier: Tier::Pro,
            expires_at: None,
            starter_pack_id: None,
            note: None,
        })
        .await
        .unwrap();
        let hash = hash_invite_code("x");
        assert!(reg.deactivate(&hash).await.unwrap());
        assert!(!reg.lookup(&hash).await.unwrap().unwrap().is_active);
        assert!(!reg.deactivate(&hash_invite_code("y")).await.unwrap());
    }
}
