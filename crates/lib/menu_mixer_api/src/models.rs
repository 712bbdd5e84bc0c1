//! Request and response bodies (camelCase on the wire).

use chrono::{DateTime, SecondsFormat, Utc};
use menu_mixer_core::ai::prompts::{ChatContext, ClientMessage};
use menu_mixer_core::ai::recipe::{ParsedRecipe, ThemedRecipe};
use menu_mixer_core::tier::Tier;
use serde::{Deserialize, Deserializer, Serialize};

/// Render a timestamp the way browsers do (`2026-07-01T00:00:00.000Z`).
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Error body shared by every failure response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// Keep string values; anything else (number, array, object) reads as absent.
fn string_or_absent<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Some(s),
        _ => None,
    })
}

/// Sign-in request. A non-string `inviteCode` is reported as missing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    #[serde(default, deserialize_with = "string_or_absent")]
    pub invite_code: Option<String>,
}

/// Tier limits plus the caller's remaining calls this month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitsSnapshot {
    pub max_recipes: i64,
    pub max_ai_calls: i64,
    pub remaining_ai_calls: i64,
}

/// Returned by `/auth/validate` and `/auth/refresh`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub success: bool,
    pub token: String,
    pub tier: Tier,
    pub limits: LimitsSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starter_pack_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageResponse {
    pub tier: Tier,
    pub monthly_ai_calls: i64,
    pub monthly_limit: i64,
    pub remaining_calls: i64,
    pub reset_at: String,
}

// ---------------------------------------------------------------------------
// AI
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseRequest {
    pub content: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParseResponse {
    pub recipes: Vec<ParsedRecipe>,
    pub remaining: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeRequest {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub recipes: Option<Vec<ParsedRecipe>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptimizeResponse {
    pub result: serde_json::Value,
    pub remaining: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThemeRequest {
    pub recipes: Option<Vec<ParsedRecipe>>,
    pub theme: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeResponse {
    pub themed_recipes: Vec<ThemedRecipe>,
    pub remaining: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    pub messages: Option<Vec<ClientMessage>>,
    pub context: Option<ChatContext>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub remaining: i64,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn timestamps_match_browser_iso_format() {
        let at = Utc.with_ymd_and_hms(2026, 7, 1, 0, 0, 0).unwrap();
        assert_eq!(format_timestamp(at), "2026-07-01T00:00:00.000Z");
    }

    #[test]
    fn token_response_omits_missing_starter_pack() {
        let resp = TokenResponse {
            success: true,
            token: "t".into(),
            tier: Tier::Free,
            limits: LimitsSnapshot {
                max_recipes: 20,
                max_ai_calls: 50,
                remaining_ai_calls: 50,
            },
            starter_pack_id: None,
        };
        let json = serde_json::to_value(resp).unwrap();
        assert_eq!(json["limits"]["remainingAiCalls"], 50);
        assert!(json.get("starterPackId").is_none());
    }

    #[test]
    fn non_string_invite_code_reads_as_absent() {
        for body in [
            r#"{"inviteCode":123}"#,
            r#"{"inviteCode":["A"]}"#,
            r#"{"inviteCode":{"code":"A"}}"#,
            r#"{"inviteCode":null}"#,
        ] {
            let req: ValidateRequest = serde_json::from_str(body).unwrap();
            assert_eq!(req.invite_code, None, "{body}");
        }
        let req: ValidateRequest = serde_json::from_str(r#"{"inviteCode":"AB-CD"}"#).unwrap();
        assert_eq!(req.invite_code.as_deref(), Some("AB-CD"));
    }

    #[test]
    fn optimize_request_reads_type_field() {
        let req: OptimizeRequest =
            serde_json::from_str(r#"{"type":"cost","recipes":[{"name":"a"}],"activeMenuIds":["x"]}"#)
                .unwrap();
        assert_eq!(req.kind.as_deref(), Some("cost"));
        assert_eq!(req.recipes.unwrap().len(), 1);
    }
}
