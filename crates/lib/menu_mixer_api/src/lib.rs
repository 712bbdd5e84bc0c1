//! # menu_mixer_api
//!
//! HTTP API library for the Menu Mixer gateway: invite-code sign-in, token
//! refresh, usage reporting, and the metered `/ai/*` routes.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use menu_mixer_core::ai::CompletionProvider;
use menu_mixer_core::invite::InviteRegistry;
use menu_mixer_core::usage::UsageLedger;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::ApiConfig;
use crate::handlers::{ai, auth, health};

/// Preflight responses may be cached for a day.
const CORS_MAX_AGE: Duration = Duration::from_secs(86_400);

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: ApiConfig,
    /// Invite code lookups.
    pub invites: InviteRegistry,
    /// Monthly quota counters.
    pub ledger: UsageLedger,
    /// Downstream LLM used by the `/ai/*` routes.
    pub provider: Arc<dyn CompletionProvider>,
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(CORS_MAX_AGE)
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);

    // Public routes (no auth required)
    let public = Router::new()
        .route("/", get(health::health))
        .route("/health", get(health::health))
        .route("/auth/validate", post(auth::validate_handler));

    // Authenticated, not billable
    let protected = Router::new()
        .route("/auth/refresh", post(auth::refresh_handler))
        .route("/auth/usage", post(auth::usage_handler))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    // Authenticated and metered; auth runs first (outermost).
    let billable = Router::new()
        .route("/ai/parse", post(ai::parse_handler))
        .route("/ai/optimize", post(ai::optimize_handler))
        .route("/ai/theme", post(ai::theme_handler))
        .route("/ai/chat", post(ai::chat_handler))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::quota::require_quota,
        ))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .merge(billable)
        .fallback(health::not_found)
        .method_not_allowed_fallback(health::not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
