//! Recipe shapes exchanged with the browser client and the provider.
//!
//! Decoding is lenient about field types: models sometimes emit `"15"` where
//! a number is expected, or a number where a string is expected.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One ingredient line.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Ingredient {
    #[serde(default, deserialize_with = "lenient_string")]
    pub item: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub quantity: String,
}

/// A recipe as extracted by the provider or sent by the client.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedRecipe {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub instructions: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub prep_time: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub assembly_time: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub cost: Option<f64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub confidence: Option<f64>,
}

/// Name and description after re-theming.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ThemedName {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
}

/// A recipe paired with its themed variant.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ThemedRecipe {
    #[serde(default, deserialize_with = "lenient_string")]
    pub original: String,
    #[serde(default)]
    pub themed: ThemedName,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => leading_number(&s),
        _ => None,
    })
}

/// Parse the leading numeric part of strings like `"15 min"` or `"$4.50"`.
fn leading_number(s: &str) -> Option<f64> {
    let trimmed = s.trim().trim_start_matches('$');
    let end = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_well_formed_recipe() {
        let r: ParsedRecipe = serde_json::from_str(
            r#"{"name":"Oat Latte","ingredients":[{"item":"oat milk","quantity":"200ml"}],
                "instructions":"Steam.","prepTime":2,"assemblyTime":3,"cost":1.2,
                "tags":["vegan"],"description":"Creamy","confidence":0.9}"#,
        )
        .unwrap();
        assert_eq!(r.name, "Oat Latte");
        assert_eq!(r.ingredients[0].quantity, "200ml");
        assert_eq!(r.prep_time, Some(2.0));
        assert_eq!(r.tags, vec!["vegan"]);
    }

    #[test]
    fn tolerates_loose_types_and_missing_fields() {
        let r: ParsedRecipe = serde_json::from_str(
            r#"{"name":"Toast","ingredients":[{"item":"bread","quantity":2}],
                "prepTime":"5 minutes","cost":"$3.50","confidence":null}"#,
        )
        .unwrap();
        assert_eq!(r.ingredients[0].quantity, "2");
        assert_eq!(r.prep_time, Some(5.0));
        assert_eq!(r.cost, Some(3.5));
        assert_eq!(r.confidence, None);
        assert!(r.instructions.is_empty());
        assert!(r.tags.is_empty());
    }

    #[test]
    fn unparseable_number_becomes_none() {
        let r: ParsedRecipe = serde_json::from_str(r#"{"prepTime":"quick"}"#).unwrap();
        assert_eq!(r.prep_time, None);
    }

    #[test]
    fn themed_recipe_round_shape() {
        let t: ThemedRecipe = serde_json::from_str(
            r#"{"original":"Toast","themed":{"name":"Sunrise Slice","description":"Golden"}}"#,
        )
        .unwrap();
        assert_eq!(t.themed.name, "Sunrise Slice");
    }
}
