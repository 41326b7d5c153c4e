//! Command-line interface definition for Medichat
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for interactive chat, session listing, and
//! credential management.

use clap::{Parser, Subcommand};

/// Medichat - CLI client for an AI health assistant
///
/// Hold multiple named conversations with the remote assistant, with
/// optional file attachments and server-side history.
#[derive(Parser, Debug, Clone)]
#[command(name = "medichat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: String,

    /// Override the server base URL from config
    #[arg(long, env = "MEDICHAT_SERVER_URL")]
    pub server_url: Option<String>,

    /// Use this bearer token instead of the one stored in the keyring
    #[arg(long)]
    pub token: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Medichat
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat with the assistant
    Chat {
        /// Select this session id on startup instead of the first one
        #[arg(short, long)]
        session: Option<String>,
    },

    /// List chat sessions stored on the server
    Sessions,

    /// Store a bearer token in the OS keyring
    Login {
        /// The token to store; prompted for interactively when omitted
        #[arg(long)]
        token: Option<String>,
    },

    /// Remove the stored bearer token
    Logout,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chat_with_session() {
        let cli = Cli::parse_from(["medichat", "chat", "--session", "s42"]);
        match cli.command {
            Commands::Chat { session } => assert_eq!(session.as_deref(), Some("s42")),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_overrides() {
        let cli = Cli::parse_from([
            "medichat",
            "--server-url",
            "http://example.com",
            "--token",
            "tok",
            "sessions",
        ]);
        assert_eq!(cli.server_url.as_deref(), Some("http://example.com"));
        assert_eq!(cli.token.as_deref(), Some("tok"));
        assert!(matches!(cli.command, Commands::Sessions));
    }

    #[test]
    fn test_parse_login_with_token() {
        let cli = Cli::parse_from(["medichat", "login", "--token", "abc"]);
        match cli.command {
            Commands::Login { token } => assert_eq!(token.as_deref(), Some("abc")),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_default_config_path() {
        let cli = Cli::parse_from(["medichat", "sessions"]);
        assert_eq!(cli.config, "config/config.yaml");
        assert!(!cli.verbose);
    }
}
