//! OpenAI chat-completion provider.
//!
//! Calls `/v1/chat/completions` with retry on transport errors, 429 and 5xx
//! (max 3 attempts, exponential backoff). Other non-2xx statuses fail
//! immediately.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::time::{Duration, sleep};
use tracing::{debug, warn};

use super::{AiError, ChatMessage, Completion, CompletionProvider};

const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-4o";

const MAX_TOKENS: u32 = 4096;
const TEMPERATURE: f32 = 0.7;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    total_tokens: i64,
}

impl From<ChatResponse> for Completion {
    fn from(resp: ChatResponse) -> Self {
        Completion {
            content: resp
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .unwrap_or_default(),
            tokens_used: resp.usage.map_or(0, |u| u.total_tokens),
        }
    }
}

/// OpenAI-backed [`CompletionProvider`].
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiProvider {
    /// Build a provider. Fails if `api_key` is empty.
    pub fn new(
        client: Client,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, AiError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(AiError::Config(
                "OPENAI_API_KEY is required for the openai provider".to_string(),
            ));
        }
        Ok(Self {
            client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<Completion, AiError> {
        let body = ChatRequest {
            model: &self.model,
            messages: &messages,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let mut last_error = None;

        for attempt in 0..MAX_RETRY_ATTEMPTS {
            let result = self
                .client
                .post(self.endpoint())
                .header("Authorization", format!("Bearer {}", self.api_key))
                .json(&body)
                .send()
                .await;

            match result {
                Ok(resp) if resp.status().is_success() => {
                    let data: ChatResponse = resp.json().await.map_err(|e| {
                        AiError::MalformedResponse(format!("OpenAI response parse error: {e}"))
                    })?;
                    let completion = Completion::from(data);
                    debug!(tokens = completion.tokens_used, "completion finished");
                    return Ok(completion);
                }
                Ok(resp) => {
                    let status = resp.status();
                    let text = resp
                        .text()
                        .await
                        .unwrap_or_else(|_| "<no body>".to_string());
                    let err = AiError::Provider(format!("OpenAI API error: {status} - {text}"));
                    if !is_retryable(status) {
                        return Err(err);
                    }
                    last_error = Some(err);
                }
                Err(e) => {
                    last_error = Some(AiError::Provider(format!("OpenAI request failed: {e}")));
                }
            }

            if attempt + 1 < MAX_RETRY_ATTEMPTS {
                let backoff = Duration::from_secs(2u64.pow(attempt + 1));
                warn!(attempt = attempt + 1, ?backoff, "retrying completion");
                sleep(backoff).await;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            AiError::Provider(format!(
                "Completion failed after {MAX_RETRY_ATTEMPTS} attempts"
            ))
        }))
    }
}
