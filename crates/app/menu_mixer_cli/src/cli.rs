use clap::{Parser, Subcommand};
use menu_mixer_core::tier::Tier;

#[derive(Parser, Debug)]
#[command(name = "menu-mixer", version)]
#[command(about = "Menu Mixer gateway administration")]
pub struct Cli {
    /// PostgreSQL connection URL
    #[arg(
        long,
        global = true,
        env = "DATABASE_URL",
        default_value = "postgres://localhost:5432/menu_mixer"
    )]
    pub database_url: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Invite code commands
    Invite {
        #[command(subcommand)]
        invite_cmd: InviteCommand,
    },
    /// Usage ledger commands
    Usage {
        #[command(subcommand)]
        usage_cmd: UsageCommand,
    },
    /// Print the identity hash of an invite code
    Hash {
        /// Invite code (case-insensitive)
        code: String,
    },
    /// Print version information
    Version,
}

#[derive(Subcommand, Debug)]
pub enum InviteCommand {
    /// Register a specific invite code
    Create {
        /// Invite code (case-insensitive)
        code: String,
        /// Tier granted by the code
        #[arg(long, default_value = "free")]
        tier: Tier,
        /// Days until the code stops being accepted
        #[arg(long)]
        expires_in_days: Option<i64>,
        /// Starter pack handed to the client on sign-in
        #[arg(long)]
        starter_pack: Option<String>,
        /// Free-form note for operators
        #[arg(long)]
        note: Option<String>,
    },
    /// Generate and register random invite codes
    Generate {
        /// Tier granted by the codes
        #[arg(long, default_value = "free")]
        tier: Tier,
        /// How many codes to create
        #[arg(long, default_value_t = 1)]
        count: u32,
        /// Days until the codes stop being accepted
        #[arg(long)]
        expires_in_days: Option<i64>,
    },
    /// Stop accepting an invite code (issued tokens stay valid)
    Deactivate {
        /// Invite code (case-insensitive)
        code: String,
    },
    /// Show the stored record for an invite code
    Show {
        /// Invite code (case-insensitive)
        code: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum UsageCommand {
    /// Show monthly usage for an invite code
    Show {
        /// Invite code (case-insensitive)
        code: String,
    },
    /// Delete usage counters whose retention has lapsed
    Purge,
}
