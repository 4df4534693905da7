//! Parallel CLI client.
//!
//! Embeds the wallet core directly: every invocation opens the encrypted
//! store, runs one operation, and exits. Session state (unlock, sign-in)
//! lives for the length of the invocation.

mod commands;
mod context;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Parallel — token-gated governance wallet.
#[derive(Parser)]
#[command(name = "parallel", version, about)]
struct Cli {
    /// Output in JSON format (no colors, machine-readable).
    #[arg(long, global = true)]
    json: bool,

    /// Load configuration from a JSON file.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Data directory holding the encrypted store.
    #[arg(long, global = true, value_name = "PATH")]
    data_dir: Option<PathBuf>,

    /// Governance backend base URL.
    #[arg(long, global = true, value_name = "URL")]
    governance_url: Option<String>,

    /// Use the Rootstock testnet profile instead of mainnet.
    #[arg(long, global = true)]
    testnet: bool,

    /// Per-request timeout in seconds.
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Wallet lifecycle: create, import, PIN, backup.
    Wallet {
        #[command(subcommand)]
        action: commands::wallet::WalletAction,
    },
    /// Balance reads and the mock-balance switch.
    Balance {
        #[command(subcommand)]
        action: commands::balance::BalanceAction,
    },
    /// Fee estimation and sending.
    Tx {
        #[command(subcommand)]
        action: commands::tx::TxAction,
    },
    /// Transaction history.
    History {
        #[command(subcommand)]
        action: commands::history::HistoryAction,
    },
    /// Governance: proposals, votes, progress updates.
    #[command(alias = "governance")]
    Gov {
        #[command(subcommand)]
        action: commands::gov::GovAction,
    },
}

// ---------------------------------------------------------------------------
// Global options passed to every command handler
// ---------------------------------------------------------------------------

/// Shared options threaded into command handlers.
pub struct GlobalOpts {
    pub json: bool,
    pub config_path: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub governance_url: Option<String>,
    pub testnet: bool,
    pub timeout_secs: Option<u64>,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let opts = GlobalOpts {
        json: cli.json,
        config_path: cli.config,
        data_dir: cli.data_dir,
        governance_url: cli.governance_url,
        testnet: cli.testnet,
        timeout_secs: cli.timeout,
    };

    let result = dispatch(opts, cli.command).await;

    if let Err(e) = result {
        output::print_error(&e, cli.json);
        std::process::exit(1);
    }
}

async fn dispatch(opts: GlobalOpts, cmd: Commands) -> std::result::Result<(), String> {
    match cmd {
        Commands::Wallet { action } => commands::wallet::run(action, &opts).await,
        Commands::Balance { action } => commands::balance::run(action, &opts).await,
        Commands::Tx { action } => commands::tx::run(action, &opts).await,
        Commands::History { action } => commands::history::run(action, &opts).await,
        Commands::Gov { action } => commands::gov::run(action, &opts).await,
    }
}
