//! Credential management commands
//!
//! `login` stores a bearer token in the OS keyring; `logout` removes it.
//! The token is the credential minted by the service's OAuth flow; this
//! client treats it as opaque.

use rustyline::DefaultEditor;

use crate::auth::KeyringAuthGate;
use crate::error::{MedichatError, Result};

/// Stores a bearer token in the keyring
///
/// Prompts interactively when no token was passed on the command line.
///
/// # Errors
///
/// Returns `MedichatError::Keyring` when the credential store rejects the
/// write, or `MedichatError::Config` for an empty token.
pub fn run_login(token: Option<String>) -> Result<()> {
    let token = match token {
        Some(token) => token,
        None => {
            let mut editor = DefaultEditor::new()?;
            editor.readline("Bearer token: ")?
        }
    };

    let token = token.trim();
    if token.is_empty() {
        return Err(MedichatError::Config("token must not be empty".into()).into());
    }

    KeyringAuthGate::new().store(token)?;
    println!("Token stored.");
    Ok(())
}

/// Removes the stored bearer token
///
/// Removing a token that was never stored is not an error.
pub fn run_logout() -> Result<()> {
    KeyringAuthGate::new().clear()?;
    println!("Token removed.");
    Ok(())
}
