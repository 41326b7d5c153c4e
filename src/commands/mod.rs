/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `chat`     — Interactive chat loop
- `sessions` — Table listing of server-side sessions
- `login`    — Store or remove the bearer credential

These handlers are intentionally small and use the library components:
the auth gate, the HTTP session client, and the chat engine.
*/

use std::sync::Arc;

use crate::auth::{AuthGate, KeyringAuthGate, StaticAuthGate};
use crate::cli::Cli;
use crate::config::Config;
use crate::error::Result;
use crate::remote::HttpSessionClient;

pub mod chat;
pub mod login;
pub mod sessions;

/// Builds the credential gate for a command invocation
///
/// A `--token` flag wins over the keyring so scripted use never touches the
/// OS credential store.
pub fn build_auth_gate(cli: &Cli) -> Arc<dyn AuthGate> {
    match &cli.token {
        Some(token) => Arc::new(StaticAuthGate::new(token.clone())),
        None => Arc::new(KeyringAuthGate::new()),
    }
}

/// Builds the HTTP session client from config and CLI state
pub fn build_client(config: &Config, auth: Arc<dyn AuthGate>) -> Result<HttpSessionClient> {
    HttpSessionClient::new(config.base_url()?, auth)
}
