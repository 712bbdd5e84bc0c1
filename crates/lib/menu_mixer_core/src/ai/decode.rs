//! Decoding of provider output into typed results.
//!
//! Models are asked for bare JSON but sometimes wrap it in prose or code
//! fences. Array results are recovered from the outermost `[...]` span; if
//! that fails too the response is reported as malformed rather than silently
//! treated as empty.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::AiError;

/// Decode a JSON array, tolerating surrounding prose.
pub fn decode_json_array<T: DeserializeOwned>(content: &str) -> Result<Vec<T>, AiError> {
    let direct_err = match serde_json::from_str::<Vec<T>>(content.trim()) {
        Ok(items) => return Ok(items),
        Err(e) => e,
    };

    if let (Some(start), Some(end)) = (content.find('['), content.rfind(']'))
        && start < end
    {
        return serde_json::from_str::<Vec<T>>(&content[start..=end])
            .map_err(|e| AiError::MalformedResponse(format!("embedded array: {e}")));
    }

    Err(AiError::MalformedResponse(format!(
        "expected a JSON array: {direct_err}"
    )))
}

/// Decode a free-form analysis object; text that is not JSON is kept as
/// `{"raw": <text>}`.
pub fn decode_analysis(content: &str) -> Value {
    serde_json::from_str::<Value>(content.trim())
        .unwrap_or_else(|_| serde_json::json!({ "raw": content }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::recipe::{ParsedRecipe, ThemedRecipe};

    #[test]
    fn bare_array_decodes() {
        let recipes: Vec<ParsedRecipe> =
            decode_json_array(r#"[{"name":"Soup"},{"name":"Bread"}]"#).unwrap();
        assert_eq!(recipes.len(), 2);
        assert_eq!(recipes[1].name, "Bread");
    }

    #[test]
    fn empty_array_decodes_to_empty() {
        let recipes: Vec<ParsedRecipe> = decode_json_array("[]").unwrap();
        assert!(recipes.is_empty());
    }

    #[test]
    fn array_inside_prose_and_fences_is_recovered() {
        let content = "Here you go:\n```json\n[{\"original\":\"Soup\",\"themed\":{\"name\":\"Witch Brew\",\"description\":\"Spooky\"}}]\n```";
        let themed: Vec<ThemedRecipe> = decode_json_array(content).unwrap();
        assert_eq!(themed[0].themed.name, "Witch Brew");
    }

    #[test]
    fn prose_without_array_is_malformed() {
        let err = decode_json_array::<ParsedRecipe>("Sorry, I can't help with that.").unwrap_err();
        assert!(matches!(err, AiError::MalformedResponse(_)));
    }

    #[test]
    fn broken_embedded_array_is_malformed() {
        let err = decode_json_array::<ParsedRecipe>("result: [ {\"name\": ] oops").unwrap_err();
        assert!(matches!(err, AiError::MalformedResponse(_)));
    }

    #[test]
    fn analysis_keeps_json_objects() {
        let v = decode_analysis(r#"{"totalCost": 12.5}"#);
        assert_eq!(v["totalCost"], 12.5);
    }

    #[test]
    fn analysis_wraps_plain_text() {
        let v = decode_analysis("Looks balanced.");
        assert_eq!(v, serde_json::json!({"raw": "Looks balanced."}));
    }
}
