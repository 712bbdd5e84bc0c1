//! Message builders for the four AI operations.

use std::collections::HashMap;

use serde::Deserialize;

use super::recipe::ParsedRecipe;
use super::{ChatMessage, ContentPart, ImageUrl, MessageContent, Role};

/// Maximum number of shared ingredients summarized into chat context.
const MAX_SHARED_INGREDIENTS: usize = 15;

const RECIPE_FIELDS: &str = "For each recipe return an object with: name; ingredients \
(array of {item, quantity}); instructions (string); prepTime and assemblyTime in minutes \
or null; cost in dollars or null; tags drawn from vegan, vegetarian, gluten-free, nut-free, \
dairy-free; description (short, customer-facing); confidence between 0 and 1.\n\
Return only a JSON array, [] if there are no recipes. No markdown.";

/// What kind of source a parse request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Text,
    Image,
    Pdf,
}

impl SourceKind {
    /// Map the client's `contentType` label; anything unrecognised is text.
    pub fn from_label(label: Option<&str>) -> Self {
        match label {
            Some("image") => SourceKind::Image,
            Some("pdf") => SourceKind::Pdf,
            _ => SourceKind::Text,
        }
    }

    fn mime_type(self) -> Option<&'static str> {
        match self {
            SourceKind::Text => None,
            SourceKind::Image => Some("image/jpeg"),
            SourceKind::Pdf => Some("application/pdf"),
        }
    }
}

/// Analysis requested from `/ai/optimize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizeKind {
    Dedupe,
    Ingredients,
    Dietary,
    Cost,
    General,
}

impl OptimizeKind {
    /// Map the client's `type` label; unknown labels get a general analysis.
    pub fn from_label(label: &str) -> Self {
        match label {
            "dedupe" => OptimizeKind::Dedupe,
            "ingredients" => OptimizeKind::Ingredients,
            "dietary" => OptimizeKind::Dietary,
            "cost" => OptimizeKind::Cost,
            _ => OptimizeKind::General,
        }
    }

    fn instructions(self) -> &'static str {
        match self {
            OptimizeKind::Dedupe => {
                "Find duplicate or near-duplicate recipes. Return JSON: \
                 {\"duplicateGroups\": [{\"recipeNames\": [..], \"similarity\": 0-1, \"suggestion\": \"..\"}]}"
            }
            OptimizeKind::Ingredients => {
                "Analyze ingredient overlap across recipes. Return JSON: \
                 {\"sharedIngredients\": [{\"ingredient\": \"..\", \"usedIn\": [..]}], \
                 \"suggestions\": [{\"suggestion\": \"..\", \"reasoning\": \"..\"}]}"
            }
            OptimizeKind::Dietary => {
                "Analyze dietary coverage of this menu. Return JSON: \
                 {\"coverage\": {\"vegan\": n, \"vegetarian\": n, \"gluten-free\": n, \"nut-free\": n, \"dairy-free\": n}, \
                 \"gaps\": [..], \"suggestions\": [{\"gap\": \"..\", \"suggestion\": \"..\"}]}"
            }
            OptimizeKind::Cost => {
                "Analyze recipe costs and suggest savings. Return JSON: \
                 {\"totalCost\": n, \"highestCost\": {\"name\": \"..\", \"cost\": n}, \
                 \"suggestions\": [{\"recipe\": \"..\", \"currentCost\": n, \"suggestion\": \"..\", \"savings\": n}]}"
            }
            OptimizeKind::General => "Analyze these recipes.",
        }
    }
}

/// A message as sent by the browser chat panel.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientMessage {
    pub role: Role,
    pub content: String,
}

/// Menu context attached to a chat request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatContext {
    #[serde(default)]
    pub recipes: Vec<ParsedRecipe>,
    #[serde(default)]
    pub active_menu: Vec<String>,
}

/// Messages for extracting recipes from pasted text.
pub fn parse_text(content: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(format!(
            "You are a recipe parsing assistant. Extract every recipe from the provided content.\n{RECIPE_FIELDS}"
        )),
        ChatMessage::user(format!("Extract recipes from:\n\n{content}")),
    ]
}

/// Messages for extracting recipes from a base64 image or PDF.
pub fn parse_document(kind: SourceKind, base64_data: &str) -> Vec<ChatMessage> {
    let Some(mime) = kind.mime_type() else {
        return parse_text(base64_data);
    };
    vec![
        ChatMessage::system(format!(
            "You are a recipe parsing assistant. Extract every recipe from the provided document.\n{RECIPE_FIELDS}"
        )),
        ChatMessage {
            role: Role::User,
            content: MessageContent::Parts(vec![
                ContentPart::Text {
                    text: "Extract recipes from this:".into(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: format!("data:{mime};base64,{base64_data}"),
                    },
                },
            ]),
        },
    ]
}

/// Messages for a menu analysis.
pub fn optimize(kind: OptimizeKind, recipes: &[ParsedRecipe]) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(kind.instructions()),
        ChatMessage::user(to_pretty_json(recipes)),
    ]
}

/// Messages for re-theming recipe names and descriptions.
pub fn theme(recipes: &[ParsedRecipe], theme: &str) -> Vec<ChatMessage> {
    let summaries: Vec<serde_json::Value> = recipes
        .iter()
        .map(|r| serde_json::json!({ "name": r.name, "description": r.description }))
        .collect();
    vec![
        ChatMessage::system(format!(
            "You are a creative menu consultant. Re-theme these recipes for \"{theme}\". \
             Give each a new name and description that fit the theme. Return a JSON array of \
             {{\"original\": \"..\", \"themed\": {{\"name\": \"..\", \"description\": \"..\"}}}}."
        )),
        ChatMessage::user(to_pretty_json(&summaries)),
    ]
}

/// Messages for the menu assistant chat, with an optional context summary.
pub fn chat(messages: &[ClientMessage], context: Option<&ChatContext>) -> Vec<ChatMessage> {
    let mut system = String::from(
        "You are a helpful menu planning assistant for a small food business. \
         Be concise and practical.",
    );
    if let Some(ctx) = context {
        if !ctx.recipes.is_empty() {
            let names: Vec<&str> = ctx.recipes.iter().map(|r| r.name.as_str()).collect();
            system.push_str(&format!("\n\nRecipes on file: {}.", names.join(", ")));
        }
        if !ctx.active_menu.is_empty() {
            system.push_str(&format!("\nActive menu: {}.", ctx.active_menu.join(", ")));
        }
        let shared = shared_ingredients(&ctx.recipes);
        if !shared.is_empty() {
            system.push_str(&format!("\nShared ingredients: {}.", shared.join(", ")));
        }
    }

    let mut out = Vec::with_capacity(messages.len() + 1);
    out.push(ChatMessage::system(system));
    out.extend(
        messages
            .iter()
            .map(|m| ChatMessage::new(m.role, m.content.clone())),
    );
    out
}

/// Ingredients used by two or more recipes, most common first.
pub fn shared_ingredients(recipes: &[ParsedRecipe]) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for recipe in recipes {
        for ingredient in &recipe.ingredients {
            *counts.entry(ingredient.item.to_lowercase()).or_default() += 1;
        }
    }
    let mut shared: Vec<(String, usize)> = counts.into_iter().filter(|(_, n)| *n >= 2).collect();
    shared.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    shared
        .into_iter()
        .take(MAX_SHARED_INGREDIENTS)
        .map(|(item, _)| item)
        .collect()
}

fn to_pretty_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}
