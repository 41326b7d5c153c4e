//! Error types for Medichat
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.
//!
//! Local precondition errors (`NothingToSend`, `NoActiveSession`,
//! `SendInProgress`, `UnknownSession`, `Unauthenticated`) are returned
//! synchronously to the caller before any network traffic. Remote failures
//! (`RemoteStatus`, `Transport`) are classified by the dispatch engine and
//! converted into synthetic assistant messages rather than surfaced as
//! errors, so the conversation remains a complete log including failures.

use thiserror::Error;

/// Main error type for Medichat operations
///
/// This enum encompasses all possible errors that can occur while managing
/// chat sessions, dispatching messages to the remote endpoint, loading
/// configuration, and handling credentials.
#[derive(Error, Debug)]
pub enum MedichatError {
    /// A send was attempted with empty text and no attachment
    #[error("Nothing to send: message text is empty and no file is attached")]
    NothingToSend,

    /// A send was attempted with no active session selected
    #[error("No active session")]
    NoActiveSession,

    /// A send is already in flight for the target session
    #[error("A send is already in progress for session {0}")]
    SendInProgress(String),

    /// The referenced session does not exist in the registry
    #[error("Unknown session: {0}")]
    UnknownSession(String),

    /// No bearer credential is available from the auth gate
    #[error("Not authenticated: no bearer credential available")]
    Unauthenticated,

    /// The server responded with a non-success HTTP status
    #[error("Server returned status {status}")]
    RemoteStatus {
        /// The HTTP status code returned by the server
        status: u16,
    },

    /// No response could be obtained (DNS failure, connection refused, etc.)
    #[error("Network error: {0}")]
    Transport(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Keyring/credential storage errors
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

/// Result type alias for Medichat operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
