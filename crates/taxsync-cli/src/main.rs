use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use taxsync_application::{NotificationCenter, TaxSessionController};
use taxsync_core::config::ClientConfig;
use taxsync_interaction::HttpStateSyncClient;

mod commands;
mod display;
mod line;

#[derive(Parser)]
#[command(name = "taxsync")]
#[command(about = "TaxSync - keep a tax-estimate session in sync with the calculation service", long_about = None)]
struct Cli {
    /// Base URL of the calculation service (overrides config and environment)
    #[arg(long, global = true)]
    server_url: Option<String>,

    /// Path to config.toml (default: <config dir>/taxsync/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive session (default)
    Repl,
    /// Load the session and print it
    Show,
    /// Load the session and print the server's tax estimate
    Calculate,
}

/// Everything a command needs, built once from the resolved config.
pub struct Session {
    pub controller: TaxSessionController,
    pub notifications: NotificationCenter,
}

fn init_tracing(config: &ClientConfig, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("taxsync=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config =
        ClientConfig::resolve(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(url) = cli.server_url {
        config = config.with_server_url(url);
        config.validate()?;
    }
    init_tracing(&config, cli.verbose);
    tracing::debug!(server_url = %config.server_url, "configuration resolved");

    let client = Arc::new(HttpStateSyncClient::from_config(&config));
    let mut session = Session {
        controller: TaxSessionController::new(client),
        notifications: NotificationCenter::new(config.notification_ttl()),
    };

    match cli.command.unwrap_or(Commands::Repl) {
        Commands::Repl => commands::repl::run(&mut session).await?,
        Commands::Show => commands::oneshot::show(&mut session).await?,
        Commands::Calculate => commands::oneshot::calculate(&mut session).await?,
    }

    Ok(())
}
