//! AI operations: the billable downstream calls behind `/ai/*`.
//!
//! # Public API
//!
//! - [`CompletionProvider`]: seam over the LLM chat-completion endpoint
//! - [`openai::OpenAiProvider`]: OpenAI implementation
//! - [`UnconfiguredProvider`]: fails every call when no key is set
//! - [`prompts`]: message builders for parse, optimize, theme and chat
//! - [`decode`]: typed decoding of provider output

pub mod decode;
pub mod openai;
pub mod prompts;
pub mod recipe;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while calling the completion provider.
#[derive(Debug, Error)]
pub enum AiError {
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One part of a multi-part message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

/// Message body: plain text or a list of parts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// A chat-completion message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, text)
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }
}

/// Provider output plus the tokens it was billed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub content: String,
    pub tokens_used: i64,
}

/// Downstream LLM provider.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Run one chat completion.
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<Completion, AiError>;
}

/// Stand-in used when no provider key is configured. Every call fails, so no
/// usage is ever recorded.
#[derive(Debug, Clone, Default)]
pub struct UnconfiguredProvider;

#[async_trait]
impl CompletionProvider for UnconfiguredProvider {
    async fn complete(&self, _messages: Vec<ChatMessage>) -> Result<Completion, AiError> {
        Err(AiError::Config("no completion provider configured".into()))
    }
}
