//! Menu Mixer gateway server binary.
//!
//! Serves invite-code sign-in and the metered `/ai/*` routes. Usage counters
//! live in PostgreSQL by default; `--store memory` keeps everything in process
//! for local development.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use clap::{Parser, ValueEnum};
use menu_mixer_api::config::{ApiConfig, parse_origins};
use menu_mixer_core::ai::openai::OpenAiProvider;
use menu_mixer_core::ai::{CompletionProvider, UnconfiguredProvider};
use menu_mixer_core::invite::{InviteRegistry, NewInvite};
use menu_mixer_core::store::{InviteStore, MemoryStore, PgStore, UsageStore};
use menu_mixer_core::tier::Tier;
use menu_mixer_core::usage::UsageLedger;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

/// Storage backend for invites and usage counters.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum StoreKind {
    Postgres,
    Memory,
}

/// CLI arguments for the gateway server.
#[derive(Parser, Debug)]
#[command(name = "menu_mixer_server", about = "Menu Mixer gateway server")]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:8787")]
    bind: String,

    /// Storage backend.
    #[arg(long, value_enum, default_value_t = StoreKind::Postgres)]
    store: StoreKind,

    /// PostgreSQL connection URL.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://localhost:5432/menu_mixer"
    )]
    database_url: String,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,

    /// Browser origin allowed by CORS. Repeatable; replaces `ALLOWED_ORIGINS`.
    #[arg(long = "allowed-origin")]
    allowed_origins: Vec<String>,

    /// Provision an invite at startup, as `CODE=tier`. Repeatable.
    #[arg(long = "seed-invite", value_parser = parse_seed)]
    seed_invites: Vec<(String, Tier)>,

    /// Seconds between sweeps of expired usage counters.
    #[arg(long, default_value_t = 3600)]
    purge_interval_secs: u64,
}

fn parse_seed(raw: &str) -> Result<(String, Tier), String> {
    let (code, tier) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected CODE=tier, got '{raw}'"))?;
    if code.trim().is_empty() {
        return Err("invite code must not be empty".into());
    }
    let tier = tier.parse::<Tier>().map_err(|e| e.to_string())?;
    Ok((code.trim().to_string(), tier))
}

/// Pick the completion provider from configuration.
fn build_provider(
    config: &ApiConfig,
) -> Result<Arc<dyn CompletionProvider>, Box<dyn std::error::Error>> {
    if config.openai_api_key.is_empty() {
        warn!("OPENAI_API_KEY is not set; /ai/* routes will fail");
        return Ok(Arc::new(UnconfiguredProvider));
    }
    let provider = OpenAiProvider::new(
        reqwest::Client::new(),
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
        config.openai_model.clone(),
    )?;
    info!(model = %config.openai_model, "completion provider configured");
    Ok(Arc::new(provider))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("info,menu_mixer_api=debug,menu_mixer_core=debug")
            }),
        )
        .init();

    let args = Args::parse();

    let mut config = ApiConfig::from_env();
    config.bind_addr = args.bind.clone();
    config.database_url = args.database_url.clone();
    if !args.allowed_origins.is_empty() {
        config.allowed_origins = parse_origins(&args.allowed_origins.join(","));
    }

    info!(bind = %config.bind_addr, store = ?args.store, "starting menu_mixer_server");

    let (invite_store, usage_store): (Arc<dyn InviteStore>, Arc<dyn UsageStore>) = match args.store
    {
        StoreKind::Postgres => {
            info!(max_connections = args.max_connections, "configuring connection pool");
            let pool = PgPoolOptions::new()
                .max_connections(args.max_connections)
                .acquire_timeout(Duration::from_secs(30))
                .connect(&config.database_url)
                .await?;

            info!("running database migrations");
            menu_mixer_core::migrate::migrate(&pool).await?;

            let store = Arc::new(PgStore::new(pool));
            (store.clone(), store)
        }
        StoreKind::Memory => {
            warn!("using in-memory store; invites and usage are lost on restart");
            let store = Arc::new(MemoryStore::new());
            (store.clone(), store)
        }
    };

    let invites = InviteRegistry::new(invite_store);
    let ledger = UsageLedger::new(usage_store);

    for (code, tier) in args.seed_invites {
        let invite = invites
            .provision(NewInvite {
                code,
                tier,
                expires_at: None,
                starter_pack_id: None,
                note: Some("seeded at startup".into()),
            })
            .await?;
        info!(code_hash = %invite.code_hash, %tier, "seeded invite");
    }

    let state = menu_mixer_api::AppState {
        provider: build_provider(&config)?,
        config: config.clone(),
        invites,
        ledger: ledger.clone(),
    };

    // Sweep expired usage counters in the background.
    let purge_every = Duration::from_secs(args.purge_interval_secs.max(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(purge_every);
        loop {
            interval.tick().await;
            match ledger.purge_expired(Utc::now()).await {
                Ok(0) => {}
                Ok(n) => info!(purged = n, "removed expired usage counters"),
                Err(e) => warn!("usage purge failed: {e}"),
            }
        }
    });

    let app = menu_mixer_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    let local_addr = listener.local_addr()?;
    info!(addr = %local_addr, "REST API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_parses_code_and_tier() {
        assert_eq!(
            parse_seed("ABCD-1234-WXYZ=Pro").unwrap(),
            ("ABCD-1234-WXYZ".to_string(), Tier::Pro)
        );
    }

    #[test]
    fn seed_rejects_bad_input() {
        assert!(parse_seed("no-separator").is_err());
        assert!(parse_seed("=free").is_err());
        assert!(parse_seed("CODE=platinum").is_err());
    }

    #[test]
    fn args_default_to_postgres() {
        let args = Args::parse_from(["menu_mixer_server"]);
        assert_eq!(args.store, StoreKind::Postgres);
        assert!(args.seed_invites.is_empty());
    }
}
