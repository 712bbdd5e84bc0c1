//! API server configuration.

use menu_mixer_core::ai::openai::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use menu_mixer_core::auth::jwt::resolve_jwt_secret;

/// Origins allowed by CORS when `ALLOWED_ORIGINS` is not set.
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 3] = [
    "https://menu-mixer.github.io",
    "http://localhost:5173",
    "http://localhost:4173",
];

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:8787").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// JWT signing secret.
    pub jwt_secret: String,
    /// Completion provider API key.
    pub openai_api_key: String,
    /// Completion provider base URL.
    pub openai_base_url: String,
    /// Completion model name.
    pub openai_model: String,
    /// Origins allowed to call the API from a browser.
    pub allowed_origins: Vec<String>,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable          | Default                                     |
    /// |-------------------|---------------------------------------------|
    /// | `BIND_ADDR`       | `127.0.0.1:8787`                            |
    /// | `DATABASE_URL`    | `postgres://localhost:5432/menu_mixer`      |
    /// | `JWT_SECRET`      | generated & persisted to file               |
    /// | `OPENAI_API_KEY`  | empty (AI routes fail until set)            |
    /// | `OPENAI_BASE_URL` | `https://api.openai.com`                    |
    /// | `OPENAI_MODEL`    | `gpt-4o`                                    |
    /// | `ALLOWED_ORIGINS` | GitHub Pages site + local Vite dev servers  |
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8787".into()),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost:5432/menu_mixer".into()),
            jwt_secret: resolve_jwt_secret(),
            openai_api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            openai_base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.into()),
            openai_model: std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into()),
            allowed_origins: std::env::var("ALLOWED_ORIGINS")
                .map(|v| parse_origins(&v))
                .unwrap_or_else(|_| default_origins()),
        }
    }
}

/// The built-in origin allow-list.
pub fn default_origins() -> Vec<String> {
    DEFAULT_ALLOWED_ORIGINS.iter().map(|s| s.to_string()).collect()
}

/// Split a comma-separated origin list, dropping blanks.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.trim_end_matches('/').to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_origins_trims_and_drops_blanks() {
        assert_eq!(
            parse_origins(" https://a.example/ ,, http://localhost:3000"),
            vec!["https://a.example", "http://localhost:3000"]
        );
    }

    #[test]
    fn default_origins_include_dev_servers() {
        let origins = default_origins();
        assert!(origins.contains(&"http://localhost:5173".to_string()));
        assert_eq!(origins.len(), 3);
    }
}
