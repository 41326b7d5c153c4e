//! Medichat - CLI client for an AI health assistant
//!
//! Main entry point: initializes tracing, loads configuration, and
//! dispatches to the command handlers.

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use medichat::cli::{Cli, Commands};
use medichat::commands;
use medichat::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    init_tracing(cli.verbose);

    let config = Config::load(&cli.config, &cli)?;
    config.validate()?;

    match &cli.command {
        Commands::Chat { .. } => {
            tracing::info!("Starting interactive chat");
            let auth = commands::build_auth_gate(&cli);
            commands::chat::run_chat(config, &cli, auth).await
        }
        Commands::Sessions => {
            let auth = commands::build_auth_gate(&cli);
            let client = commands::build_client(&config, auth)?;
            commands::sessions::run_sessions(&client).await
        }
        Commands::Login { token } => commands::login::run_login(token.clone()),
        Commands::Logout => commands::login::run_logout(),
    }
}

/// Initialize the tracing subscriber
///
/// `RUST_LOG` takes precedence; `--verbose` bumps the default to debug.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "medichat=debug" } else { "medichat=info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
