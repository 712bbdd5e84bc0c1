//! Invite code records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tier::Tier;

/// A provisioned access grant, keyed by the hash of its code.
///
/// The plaintext code is never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteCode {
    pub code_hash: String,
    pub tier: Tier,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Opaque reference handed to the client for first-run seeding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starter_pack_id: Option<String>,
    /// Free-text note for administrators.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Why an existing invite code was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InviteRejection {
    Inactive,
    Expired,
}

impl InviteCode {
    /// Check whether this code may be exchanged for a token at `now`.
    ///
    /// Inactivity is reported before expiry.
    pub fn admit(&self, now: DateTime<Utc>) -> Result<(), InviteRejection> {
        if !self.is_active {
            return Err(InviteRejection::Inactive);
        }
        if let Some(expires_at) = self.expires_at
            && expires_at < now
        {
            return Err(InviteRejection::Expired);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn invite(is_active: bool, expires_at: Option<DateTime<Utc>>) -> InviteCode {
        InviteCode {
            code_hash: "abc".into(),
            tier: Tier::Free,
            is_active,
            expires_at,
            starter_pack_id: None,
            note: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn active_without_expiry_is_admitted() {
        assert_eq!(invite(true, None).admit(Utc::now()), Ok(()));
    }

    #[test]
    fn inactive_is_rejected() {
        assert_eq!(
            invite(false, None).admit(Utc::now()),
            Err(InviteRejection::Inactive)
        );
    }

    #[test]
    fn expired_is_rejected() {
        let now = Utc::now();
        assert_eq!(
            invite(true, Some(now - Duration::hours(1))).admit(now),
            Err(InviteRejection::Expired)
        );
    }

    #[test]
    fn inactive_reported_before_expired() {
        let now = Utc::now();
        assert_eq!(
            invite(false, Some(now - Duration::hours(1))).admit(now),
            Err(InviteRejection::Inactive)
        );
    }

    #[test]
    fn future_expiry_is_admitted() {
        let now = Utc::now();
        assert!(invite(true, Some(now + Duration::days(3))).admit(now).is_ok());
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(invite(true, None)).unwrap();
        assert_eq!(json["codeHash"], "abc");
        assert_eq!(json["isActive"], true);
        assert!(json.get("starterPackId").is_none());
    }
}
