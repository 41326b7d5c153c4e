//! Core data types for chat sessions and messages
//!
//! Wire compatibility matters here: a [`ChatMessage`] serializes to the
//! exact shape the backend persists (`sender`, `text`, `fileName`,
//! `filePath`, `timestamp`), so these types are used both in the in-memory
//! registry and on the HTTP boundary.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Placeholder title given to freshly minted sessions
///
/// A session still carrying this title has its title derived from the
/// first user message; any other title is treated as explicitly chosen
/// and kept.
pub const DEFAULT_SESSION_TITLE: &str = "New Chat";

/// Role of a message author
///
/// Serializes to the wire strings `"user"` and `"ai"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// Message typed by the user
    User,
    /// Reply produced by the remote model (or a synthetic failure notice)
    Ai,
}

/// A single message within a chat session
///
/// Messages are immutable once appended; the only permitted late edit is
/// attaching a server-resolved `file_path` to the most recent user message
/// of the same exchange, which the reconciler performs.
///
/// # Examples
///
/// ```
/// use medichat::session::{ChatMessage, Sender};
///
/// let msg = ChatMessage::user("What are the symptoms of flu?", None);
/// assert_eq!(msg.sender, Sender::User);
/// assert!(msg.file_path.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who authored the message
    pub sender: Sender,

    /// Message body; may be empty only when an attachment is present
    pub text: String,

    /// Display name of an attached file, if any
    #[serde(rename = "fileName", default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,

    /// Server-assigned storage path, filled in once the upload is confirmed
    #[serde(rename = "filePath", default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,

    /// Client-assigned creation time (RFC-3339); never renumbered
    pub timestamp: String,
}

impl ChatMessage {
    /// Creates a user message timestamped now
    ///
    /// # Arguments
    ///
    /// * `text` - The message body
    /// * `file_name` - Display name of the attached file, if any
    pub fn user(text: impl Into<String>, file_name: Option<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            file_name,
            file_path: None,
            timestamp: now_rfc3339(),
        }
    }

    /// Creates an assistant message timestamped now
    ///
    /// Also used for synthetic failure notices (timeout, network error),
    /// which are appended with the `ai` role so the transcript stays a
    /// complete log.
    pub fn ai(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Ai,
            text: text.into(),
            file_name: None,
            file_path: None,
            timestamp: now_rfc3339(),
        }
    }
}

/// Listing shape for a session: metadata without message bodies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Server-assigned opaque identifier
    pub id: String,
    /// Human-readable title
    pub title: String,
    /// Server-side creation time (RFC-3339)
    pub created_at: String,
}

/// A chat session held in the registry
///
/// The message sequence is append-only from the client's perspective;
/// insertion order is chronological order. All mutations go through the
/// reconciler.
#[derive(Debug, Clone)]
pub struct ChatSession {
    /// Server-assigned opaque identifier
    pub id: String,
    /// Human-readable title, derived from the first user message while it
    /// is still the default
    pub title: String,
    /// Creation time (RFC-3339)
    pub created_at: String,
    /// Ordered message sequence
    pub messages: Vec<ChatMessage>,
    /// Latch ensuring the title is derived at most once
    pub(crate) title_derived: bool,
}

impl ChatSession {
    /// Creates an empty session with the given id and title
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            created_at: now_rfc3339(),
            messages: Vec::new(),
            title_derived: false,
        }
    }

    /// Creates a session from a remote summary, without message bodies
    ///
    /// Messages are hydrated lazily when the session is selected. Title
    /// derivation stays armed here; hydration disarms it when the restored
    /// history turns out to be non-empty, so a restored title is kept as-is.
    pub fn from_summary(summary: SessionSummary) -> Self {
        Self {
            id: summary.id,
            title: summary.title,
            created_at: summary.created_at,
            messages: Vec::new(),
            title_derived: false,
        }
    }

    /// Returns the listing shape for this session
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            created_at: self.created_at.clone(),
        }
    }
}

/// An outgoing file attachment: display name plus raw bytes
#[derive(Debug, Clone)]
pub struct Attachment {
    /// File name shown in the transcript and sent in the multipart part
    pub file_name: String,
    /// Raw file contents
    pub bytes: Vec<u8>,
}

/// Get current timestamp in RFC-3339 format
///
/// Used consistently for all message timestamps so they survive the
/// round-trip through the backend store.
///
/// # Examples
///
/// ```
/// use medichat::session::now_rfc3339;
///
/// let timestamp = now_rfc3339();
/// assert!(chrono::DateTime::parse_from_rfc3339(&timestamp).is_ok());
/// ```
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}
