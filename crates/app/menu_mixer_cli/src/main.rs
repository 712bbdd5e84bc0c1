// Import and re-export the `error` module
pub use self::error::{Error, Result};
mod error;

use std::sync::Arc;

use chrono::{Duration, Utc};
use clap::Parser;
use cli::{Cli, Commands, InviteCommand, UsageCommand};
use menu_mixer_core::invite::{InviteRegistry, NewInvite, generate_invite_code, hash_invite_code};
use menu_mixer_core::models::invite::InviteCode;
use menu_mixer_core::store::PgStore;
use menu_mixer_core::usage::UsageLedger;

mod cli;
mod logging;

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = run().await {
        log::error!("{}", e);
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    logging::init()?;

    let args = Cli::parse();

    match args.command {
        Commands::Version => {
            println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        }
        Commands::Hash { code } => {
            println!("{}", hash_invite_code(&code));
        }
        Commands::Invite { invite_cmd } => {
            let store = connect(&args.database_url).await?;
            invite(InviteRegistry::new(store), invite_cmd).await?;
        }
        Commands::Usage { usage_cmd } => {
            let store = connect(&args.database_url).await?;
            usage(UsageLedger::new(store), usage_cmd).await?;
        }
    }

    Ok(())
}

async fn connect(database_url: &str) -> Result<Arc<PgStore>> {
    let pool = sqlx::PgPool::connect(database_url).await?;
    menu_mixer_core::migrate::migrate(&pool).await?;
    Ok(Arc::new(PgStore::new(pool)))
}

fn expiry(days: Option<i64>) -> Result<Option<chrono::DateTime<Utc>>> {
    match days {
        Some(d) if d <= 0 => Err(Error::Custom("--expires-in-days must be positive".into())),
        Some(d) => Ok(Some(Utc::now() + Duration::days(d))),
        None => Ok(None),
    }
}

fn print_invite(invite: &InviteCode) {
    println!("hash:         {}", invite.code_hash);
    println!("tier:         {}", invite.tier);
    println!("active:       {}", invite.is_active);
    println!(
        "expires:      {}",
        invite
            .expires_at
            .map_or_else(|| "never".to_string(), |at| at.to_rfc3339())
    );
    if let Some(pack) = &invite.starter_pack_id {
        println!("starter pack: {pack}");
    }
    if let Some(note) = &invite.note {
        println!("note:         {note}");
    }
    println!("created:      {}", invite.created_at.to_rfc3339());
}

async fn invite(registry: InviteRegistry, cmd: InviteCommand) -> Result<()> {
    match cmd {
        InviteCommand::Create {
            code,
            tier,
            expires_in_days,
            starter_pack,
            note,
        } => {
            let invite = registry
                .provision(NewInvite {
                    code: code.trim().to_string(),
                    tier,
                    expires_at: expiry(expires_in_days)?,
                    starter_pack_id: starter_pack,
                    note,
                })
                .await?;
            log::info!("created {} invite {}", invite.tier, invite.code_hash);
            print_invite(&invite);
        }
        InviteCommand::Generate {
            tier,
            count,
            expires_in_days,
        } => {
            let expires_at = expiry(expires_in_days)?;
            for _ in 0..count {
                let code = generate_invite_code();
                registry
                    .provision(NewInvite {
                        code: code.clone(),
                        tier,
                        expires_at,
                        starter_pack_id: None,
                        note: None,
                    })
                    .await?;
                println!("{code}");
            }
            log::info!("generated {count} {tier} invite(s)");
        }
        InviteCommand::Deactivate { code } => {
            let hash = hash_invite_code(code.trim());
            if !registry.deactivate(&hash).await? {
                return Err(Error::Custom(format!("no invite found for {hash}")));
            }
            log::info!("deactivated invite {hash}");
        }
        InviteCommand::Show { code } => {
            let hash = hash_invite_code(code.trim());
            let invite = registry
                .lookup(&hash)
                .await?
                .ok_or_else(|| Error::Custom(format!("no invite found for {hash}")))?;
            print_invite(&invite);
        }
    }
    Ok(())
}

async fn usage(ledger: UsageLedger, cmd: UsageCommand) -> Result<()> {
    match cmd {
        UsageCommand::Show { code } => {
            let hash = hash_invite_code(code.trim());
            let history = ledger.history(&hash, Utc::now()).await?;
            if history.is_empty() {
                println!("no usage recorded");
            }
            for (month, record) in history {
                println!(
                    "{month}  calls={:<6} tokens={:<10} last={}",
                    record.ai_calls,
                    record.tokens_used,
                    record.last_call.to_rfc3339()
                );
            }
        }
        UsageCommand::Purge => {
            let purged = ledger.purge_expired(Utc::now()).await?;
            println!("purged {purged} expired counter(s)");
        }
    }
    Ok(())
}
