//! Bearer credential sources
//!
//! The engine and the HTTP client treat credentials as opaque: an
//! [`AuthGate`] either produces a bearer token or it does not. A missing
//! token refuses dispatch with `Unauthenticated` before any network call.
//!
//! Two gates are provided: [`KeyringAuthGate`] stores the token in the OS
//! native credential store (Keychain on macOS, Secret Service on Linux,
//! Windows Credential Manager on Windows), and [`StaticAuthGate`] holds it
//! in memory for `--token` overrides and tests.

use std::sync::RwLock;

use crate::error::{MedichatError, Result};

/// Keyring service name under which the token is stored
const KEYRING_SERVICE: &str = "medichat";

/// Keyring account name for the bearer token entry
const KEYRING_ACCOUNT: &str = "bearer-token";

/// Opaque source of the bearer credential used by the remote client
pub trait AuthGate: Send + Sync {
    /// Returns the current bearer token, or `None` when unauthenticated
    fn bearer_token(&self) -> Option<String>;

    /// Drops the credential so subsequent dispatches are refused
    fn invalidate(&self);
}

/// In-memory credential holder
///
/// # Examples
///
/// ```
/// use medichat::auth::{AuthGate, StaticAuthGate};
///
/// let gate = StaticAuthGate::new("secret");
/// assert_eq!(gate.bearer_token().as_deref(), Some("secret"));
///
/// gate.invalidate();
/// assert!(gate.bearer_token().is_none());
/// ```
#[derive(Debug, Default)]
pub struct StaticAuthGate {
    token: RwLock<Option<String>>,
}

impl StaticAuthGate {
    /// Creates a gate holding the given token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }

    /// Creates a gate with no credential
    pub fn empty() -> Self {
        Self::default()
    }
}

impl AuthGate for StaticAuthGate {
    fn bearer_token(&self) -> Option<String> {
        self.token.read().ok().and_then(|t| t.clone())
    }

    fn invalidate(&self) {
        if let Ok(mut token) = self.token.write() {
            *token = None;
        }
    }
}

/// Credential gate backed by the OS keyring
///
/// The keyring is stateless; this is a zero-field accessor namespaced under
/// the `medichat` service.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyringAuthGate;

impl KeyringAuthGate {
    /// Creates the keyring-backed gate
    pub fn new() -> Self {
        Self
    }

    fn entry() -> Result<keyring::Entry> {
        keyring::Entry::new(KEYRING_SERVICE, KEYRING_ACCOUNT)
            .map_err(|e| MedichatError::Keyring(e).into())
    }

    /// Stores a bearer token in the keyring, replacing any existing one
    ///
    /// # Errors
    ///
    /// Returns `MedichatError::Keyring` if the credential store rejects the
    /// write.
    pub fn store(&self, token: &str) -> Result<()> {
        Self::entry()?
            .set_password(token)
            .map_err(|e| MedichatError::Keyring(e).into())
    }

    /// Removes the stored bearer token
    ///
    /// Removing a token that was never stored is not an error.
    pub fn clear(&self) -> Result<()> {
        match Self::entry()?.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(MedichatError::Keyring(e).into()),
        }
    }
}

impl AuthGate for KeyringAuthGate {
    fn bearer_token(&self) -> Option<String> {
        Self::entry().ok()?.get_password().ok()
    }

    fn invalidate(&self) {
        if let Err(err) = self.clear() {
            tracing::warn!(error = %err, "failed to clear keyring credential");
        }
    }
}
