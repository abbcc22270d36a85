use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxtab::log::init_logging;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for fxtab::AppCommand {
    fn from(cmd: Commands) -> fxtab::AppCommand {
        match cmd {
            Commands::Rates { currency, date } => fxtab::AppCommand::Rates { currency, date },
            Commands::Favorites(FavoritesCommands::Add { from, to }) => {
                fxtab::AppCommand::FavoriteAdd { from, to }
            }
            Commands::Favorites(FavoritesCommands::Remove { from, to }) => {
                fxtab::AppCommand::FavoriteRemove { from, to }
            }
            Commands::Favorites(FavoritesCommands::List) => fxtab::AppCommand::FavoriteList,
            Commands::Export { output } => fxtab::AppCommand::Export { output },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Show the rate table for a base currency on a date
    Rates {
        /// Base currency code (defaults to the configured one)
        currency: Option<String>,

        /// Date to resolve: "latest", yyyy.M.d, or common formats like 1/1/25
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Manage favorite currency pairs
    #[command(subcommand)]
    Favorites(FavoritesCommands),
    /// Export favorite conversion rates as CSV
    Export {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum FavoritesCommands {
    /// Save a currency pair
    Add { from: String, to: String },
    /// Remove a saved currency pair
    Remove { from: String, to: String },
    /// Show current rates for every saved pair
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping...");
            signal_cancel.cancel();
        }
    });

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => fxtab::run_command(cmd.into(), cli.config_path.as_deref(), cancel).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

fn setup() -> anyhow::Result<()> {
    use anyhow::Context;

    let path = fxtab::config::AppConfig::default_config_path()?;

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let default_config = r#"---
# Remote rate source; dated snapshots are fetched from it per currency.
source:
  base_url: "https://cdn.jsdelivr.net/npm/@fawazahmed0"

# Where cached snapshots and the favorites file live; platform defaults
# are used when these are unset.
# cache_dir: "/path/to/cache"
# favorites_path: "/path/to/favorites.json"

# Base currency used when `rates` is called without one.
currency: "usd"
"#;

    std::fs::write(&path, default_config)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}
