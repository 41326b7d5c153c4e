//! Configuration management for Medichat
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from a YAML file and CLI overrides. Precedence, lowest
//! to highest: file defaults, file values, CLI flags. The
//! `MEDICHAT_SERVER_URL` environment variable feeds the `--server-url`
//! flag through clap, so it arrives here as a CLI override.

use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

use crate::cli::Cli;
use crate::error::{MedichatError, Result};

/// Main configuration structure for Medichat
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Remote endpoint settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Chat behavior settings
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Remote endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the backend service
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

/// Chat behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Deadline for one send operation (seconds)
    #[serde(default = "default_send_timeout")]
    pub send_timeout_seconds: u64,

    /// Title given to freshly minted sessions
    #[serde(default = "default_session_title")]
    pub default_session_title: String,
}

fn default_send_timeout() -> u64 {
    60
}

fn default_session_title() -> String {
    "New Chat".to_string()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            send_timeout_seconds: default_send_timeout(),
            default_session_title: default_session_title(),
        }
    }
}

impl Config {
    /// Loads configuration, applying CLI overrides
    ///
    /// A missing config file is not an error; defaults are used so the
    /// client works out of the box against a local backend.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML configuration file
    /// * `cli` - Parsed CLI arguments whose flags override file values
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>, cli: &Cli) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path).map_err(MedichatError::Io)?;
            serde_yaml::from_str(&contents).map_err(MedichatError::Yaml)?
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };

        if let Some(url) = &cli.server_url {
            config.server.base_url = url.clone();
        }

        Ok(config)
    }

    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns `MedichatError::Config` when the base URL does not parse or
    /// the send timeout is zero.
    pub fn validate(&self) -> Result<()> {
        self.base_url()?;
        if self.chat.send_timeout_seconds == 0 {
            return Err(
                MedichatError::Config("send_timeout_seconds must be greater than 0".into()).into(),
            );
        }
        if self.chat.default_session_title.is_empty() {
            return Err(
                MedichatError::Config("default_session_title must not be empty".into()).into(),
            );
        }
        Ok(())
    }

    /// Returns the parsed server base URL
    pub fn base_url(&self) -> Result<Url> {
        Url::parse(&self.server.base_url).map_err(|e| {
            MedichatError::Config(format!(
                "invalid server base URL {}: {}",
                self.server.base_url, e
            ))
            .into()
        })
    }

    /// Returns the send deadline as a duration
    pub fn send_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.chat.send_timeout_seconds)
    }
}
