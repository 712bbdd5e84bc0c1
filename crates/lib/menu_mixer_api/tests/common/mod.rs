//! Shared fixtures: an in-memory gateway with a scripted completion provider.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use chrono::Utc;
use menu_mixer_api::config::{ApiConfig, default_origins};
use menu_mixer_api::{AppState, router};
use menu_mixer_core::ai::{AiError, ChatMessage, Completion, CompletionProvider};
use menu_mixer_core::invite::{InviteRegistry, NewInvite, hash_invite_code};
use menu_mixer_core::store::MemoryStore;
use menu_mixer_core::tier::Tier;
use menu_mixer_core::usage::UsageLedger;
use serde_json::Value;
use tower::ServiceExt;

pub const SECRET: &str = "test-secret";

/// Provider that returns a fixed reply (or fails) and counts its calls.
pub struct ScriptedProvider {
    reply: Option<String>,
    calls: AtomicU32,
}

impl ScriptedProvider {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            calls: AtomicU32::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(&self, _messages: Vec<ChatMessage>) -> Result<Completion, AiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Some(content) => Ok(Completion {
                content: content.clone(),
                tokens_used: 42,
            }),
            None => Err(AiError::Provider("upstream returned 503".into())),
        }
    }
}

pub struct TestApp {
    pub router: Router,
    pub invites: InviteRegistry,
    pub ledger: UsageLedger,
    pub provider: Arc<ScriptedProvider>,
}

pub const RECIPES_REPLY: &str = r#"[{"name":"Iced Matcha","ingredients":[{"item":"matcha","quantity":"2 tsp"}],"instructions":"Whisk and pour.","prepTime":3,"assemblyTime":1,"cost":1.5,"tags":["drink"],"description":"Cold and green.","confidence":0.9}]"#;

impl TestApp {
    pub fn new(provider: ScriptedProvider) -> Self {
        let store = Arc::new(MemoryStore::new());
        let invites = InviteRegistry::new(store.clone());
        let ledger = UsageLedger::new(store);
        let provider = Arc::new(provider);

        let state = AppState {
            config: ApiConfig {
                bind_addr: "127.0.0.1:0".into(),
                database_url: String::new(),
                jwt_secret: SECRET.into(),
                openai_api_key: String::new(),
                openai_base_url: String::new(),
                openai_model: String::new(),
                allowed_origins: default_origins(),
            },
            invites: invites.clone(),
            ledger: ledger.clone(),
            provider: provider.clone(),
        };

        Self {
            router: router(state),
            invites,
            ledger,
            provider,
        }
    }

    pub fn with_recipes() -> Self {
        Self::new(ScriptedProvider::replying(RECIPES_REPLY))
    }

    /// Provision an active invite and return its hash.
    pub async fn invite(&self, code: &str, tier: Tier) -> String {
        self.invites
            .provision(NewInvite {
                code: code.into(),
                tier,
                expires_at: None,
                starter_pack_id: None,
                note: None,
            })
            .await
            .unwrap();
        hash_invite_code(code)
    }

    /// Record `n` calls for `code_hash` this month.
    pub async fn spend(&self, code_hash: &str, n: usize) {
        for _ in 0..n {
            self.ledger.record(code_hash, 10, Utc::now()).await.unwrap();
        }
    }

    pub async fn calls_this_month(&self, code_hash: &str) -> i64 {
        self.ledger
            .calls_in_month(code_hash, Utc::now())
            .await
            .unwrap()
    }

    /// Exchange `code` for a token via the public endpoint.
    pub async fn sign_in(&self, code: &str) -> String {
        let (status, json, _) = self
            .send(
                Method::POST,
                "/auth/validate",
                None,
                Some(serde_json::json!({ "inviteCode": code })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "sign-in failed: {json}");
        json["token"].as_str().unwrap().to_string()
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value, HeaderMap) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = match body {
            Some(body) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => req.body(Body::empty()).unwrap(),
        };
        self.dispatch(req).await
    }

    pub async fn dispatch(&self, req: Request<Body>) -> (StatusCode, Value, HeaderMap) {
        let resp = self.router.clone().oneshot(req).await.expect("request");
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("parse JSON")
        };
        (status, json, headers)
    }
}
