//! Remote session client abstraction
//!
//! The engine talks to the backend through the [`RemoteSessionClient`]
//! trait so that dispatch logic is testable against in-process fakes. The
//! production implementation is [`HttpSessionClient`], which speaks the
//! backend's HTTP surface with a bearer credential from the auth gate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::session::{Attachment, ChatMessage, SessionSummary};

pub mod http;

pub use http::HttpSessionClient;

/// Response payload of the `ask` operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskReply {
    /// The model's answer text
    pub result: String,
    /// Server-assigned storage path for the uploaded file, when one was sent
    #[serde(rename = "filePath", default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

/// Response payload of session creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedSession {
    /// The server-minted session identifier
    pub session_id: String,
}

/// Response payload of a session fetch: the full message history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMessages {
    /// Messages in chronological order
    pub messages: Vec<ChatMessage>,
}

/// HTTP/RPC surface of the backend session store
///
/// All calls carry the bearer credential supplied by the auth gate; a
/// missing credential fails with `MedichatError::Unauthenticated` before
/// any request is made. Server-side error statuses surface as
/// `MedichatError::RemoteStatus`, and failures to obtain any response at
/// all as `MedichatError::Transport`.
#[async_trait]
pub trait RemoteSessionClient: Send + Sync {
    /// Lists session summaries in server order
    async fn list_sessions(&self) -> Result<Vec<SessionSummary>>;

    /// Mints a new server-side session with the given title
    async fn create_session(&self, title: &str) -> Result<CreatedSession>;

    /// Fetches the full message history of a session
    async fn get_session(&self, id: &str) -> Result<SessionMessages>;

    /// Submits a question (and optional file) to the inference endpoint
    ///
    /// This is the long-running call the dispatcher races against its
    /// deadline; implementations must be cancellation-safe.
    async fn ask(&self, question: &str, file: Option<&Attachment>) -> Result<AskReply>;

    /// Durably appends a confirmed message to a session's server-side log
    async fn append_message(&self, session_id: &str, message: &ChatMessage) -> Result<()>;
}

/// Lets a shared client handle be used anywhere an owned client is expected.
#[async_trait]
impl<T: RemoteSessionClient + ?Sized> RemoteSessionClient for std::sync::Arc<T> {
    async fn list_sessions(&self) -> Result<Vec<SessionSummary>> {
        (**self).list_sessions().await
    }

    async fn create_session(&self, title: &str) -> Result<CreatedSession> {
        (**self).create_session(title).await
    }

    async fn get_session(&self, id: &str) -> Result<SessionMessages> {
        (**self).get_session(id).await
    }

    async fn ask(&self, question: &str, file: Option<&Attachment>) -> Result<AskReply> {
        (**self).ask(question, file).await
    }

    async fn append_message(&self, session_id: &str, message: &ChatMessage) -> Result<()> {
        (**self).append_message(session_id, message).await
    }
}
