//! Session state for Medichat
//!
//! This module contains the session registry, the message/session data
//! types shared with the wire protocol, and the reconciler through which
//! all message-sequence mutations flow.

pub mod reconcile;
pub mod registry;
pub mod types;

pub use registry::SessionRegistry;
pub use types::{
    now_rfc3339, Attachment, ChatMessage, ChatSession, Sender, SessionSummary,
    DEFAULT_SESSION_TITLE,
};
