// # kitsu - link shortener client CLI
//
// Thin integration layer only:
// 1. Parse flags / environment variables
// 2. Initialize tracing
// 3. Wire the HTTP client, history store and manager together
// 4. Run exactly one manager operation and print the outcome
//
// All synchronization logic lives in kitsu-core; all HTTP specifics live in
// kitsu-api-http. Nothing here should grow business logic.
//
// ## Configuration
//
// - `--api-url` / `KITSU_API_URL`: base address of the shortening service
// - `--history-path` / `KITSU_HISTORY_PATH`: path to the history file
// - `--log-level` / `KITSU_LOG`: tracing level (error, warn, info, debug, trace)

use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{Level, error};
use tracing_subscriber::FmtSubscriber;

use kitsu_api_http::{ApiConfig, DEFAULT_BASE_URL, HttpShortenerApi};
use kitsu_core::store::FileHistoryStore;
use kitsu_core::{HistoryManager, LinkRecord, SyncConfig};

/// Exit codes for different termination scenarios
#[derive(Debug, Clone, Copy)]
enum CliExitCode {
    /// Operation completed
    Success = 0,
    /// Configuration or startup error
    ConfigError = 1,
    /// Operation failed (validation or network)
    OperationError = 2,
}

impl From<CliExitCode> for ExitCode {
    fn from(code: CliExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

#[derive(Debug, Parser)]
#[command(name = "kitsu", about = "Create and manage short links")]
struct Cli {
    /// Base address of the shortening service
    #[arg(long, env = "KITSU_API_URL", default_value = DEFAULT_BASE_URL)]
    api_url: String,

    /// Path to the local history file
    #[arg(long, env = "KITSU_HISTORY_PATH", default_value = "kitsu-history.json")]
    history_path: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, env = "KITSU_LOG", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Shorten a long URL
    Shorten {
        /// The URL to shorten
        url: String,
    },
    /// List the local link history
    List,
    /// Delete a short link
    Delete {
        /// The short code to delete
        short_code: String,
    },
    /// Change the target URL of a short link
    Update {
        /// The short code to update
        short_code: String,
        /// The new target URL
        url: String,
    },
    /// Fetch access statistics for a short link
    Stats {
        /// The short code to query
        short_code: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = Level::from_str(&cli.log_level).unwrap_or(Level::WARN);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Failed to initialize logging");
        return CliExitCode::ConfigError.into();
    }

    // The receiver stays alive for the lifetime of the command so manager
    // events are never reported against a closed channel.
    let (manager, _event_rx) = match build_manager(&cli).await {
        Ok(pair) => pair,
        Err(e) => {
            error!("Startup failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            return CliExitCode::ConfigError.into();
        }
    };

    manager.initialize().await;

    match run(&manager, cli.command).await {
        Ok(()) => CliExitCode::Success.into(),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            CliExitCode::OperationError.into()
        }
    }
}

/// Wire the store, client and manager together
async fn build_manager(
    cli: &Cli,
) -> Result<(
    HistoryManager,
    tokio::sync::mpsc::Receiver<kitsu_core::HistoryEvent>,
)> {
    let api = HttpShortenerApi::new(ApiConfig::new(cli.api_url.clone()))
        .context("invalid API configuration")?;

    let store = FileHistoryStore::new(&cli.history_path)
        .await
        .with_context(|| format!("cannot open history at {}", cli.history_path))?;

    HistoryManager::new(Box::new(api), Box::new(store), SyncConfig::default())
        .context("invalid sync configuration")
}

/// Run one manager operation and print the outcome
async fn run(manager: &HistoryManager, command: Command) -> Result<()> {
    match command {
        Command::Shorten { url } => {
            let record = manager.create(&url).await?;
            println!("{}", manager.redirect_url(&record.short_code));
            println!("  {} -> {}", record.short_code, record.long_url);
        }
        Command::List => {
            let snapshot = manager.snapshot().await;
            if snapshot.records.is_empty() {
                println!("No history yet");
                return Ok(());
            }
            for record in &snapshot.records {
                print_record(manager, record);
            }
        }
        Command::Delete { short_code } => {
            manager.delete(&short_code).await?;
            println!("Deleted {}", short_code);
        }
        Command::Update { short_code, url } => {
            let record = manager.update(&short_code, &url).await?;
            println!("Updated {} -> {}", short_code, record.long_url);
        }
        Command::Stats { short_code } => {
            let count = manager.refresh_stats(&short_code).await?;
            println!("{} accessed {} times", short_code, count);
        }
    }
    Ok(())
}

fn print_record(manager: &HistoryManager, record: &LinkRecord) {
    println!("{}  {}", record.short_code, manager.redirect_url(&record.short_code));
    println!("    -> {}", record.long_url);
    if let Some(updated_at) = record.updated_at {
        println!("    updated {}", updated_at.to_rfc3339());
    }
    if let Some(count) = record.access_count {
        println!("    accessed {} times", count);
    }
}
