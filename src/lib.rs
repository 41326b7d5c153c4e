//! Medichat - CLI client library for an AI health assistant
//!
//! This library provides the core functionality for the Medichat client:
//! session synchronization, message dispatch with deadline and
//! cancellation, reconciliation of optimistic local state with the remote
//! store, and the HTTP/auth plumbing around it.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `engine`: Message dispatch, per-session pending tracking, outcome
//!   classification
//! - `session`: Session registry, data types, and the reconciler
//! - `remote`: Remote session client trait and the `reqwest` implementation
//! - `auth`: Bearer credential sources (keyring, in-memory)
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use medichat::auth::StaticAuthGate;
//! use medichat::engine::ChatEngine;
//! use medichat::remote::HttpSessionClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let auth = Arc::new(StaticAuthGate::new("token"));
//!     let client = HttpSessionClient::new("http://localhost:8000".parse()?, auth.clone())?;
//!     let engine = ChatEngine::new(client, auth);
//!
//!     engine.bootstrap().await?;
//!     engine.send("What are the symptoms of flu?", None).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod remote;
pub mod session;

// Re-export commonly used types
pub use config::Config;
pub use engine::{ChatEngine, SendOutcome};
pub use error::{MedichatError, Result};
pub use session::{Attachment, ChatMessage, ChatSession, Sender, SessionRegistry, SessionSummary};
