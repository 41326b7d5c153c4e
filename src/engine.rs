//! Chat session synchronization and message delivery engine
//!
//! [`ChatEngine`] owns the session registry and executes sends against the
//! remote endpoint. One send may be in flight per session at a time; sends
//! on different sessions proceed concurrently. Each send races the remote
//! `ask` call against a deadline through a per-exchange
//! [`CancellationToken`]; the `tokio::select!` below acts as the
//! single-assignment completion slot, so exactly one outcome is produced
//! no matter how the race resolves.
//!
//! Remote, timeout, and transport failures are never returned to the
//! caller: they become synthetic assistant messages appended to the
//! session, keeping the transcript a complete, inspectable log. Only local
//! precondition violations (`NothingToSend`, `NoActiveSession`,
//! `SendInProgress`, `Unauthenticated`, `UnknownSession`) surface as
//! errors.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::auth::AuthGate;
use crate::error::{MedichatError, Result};
use crate::remote::{AskReply, RemoteSessionClient};
use crate::session::{
    reconcile, Attachment, ChatMessage, ChatSession, SessionRegistry, SessionSummary,
};

pub use crate::session::DEFAULT_SESSION_TITLE;

/// Default deadline for one send operation
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(60);

/// Terminal outcome of one dispatched exchange
///
/// All four variants clear the pending exchange; all but a local
/// precondition failure leave an assistant (or synthetic) message in the
/// session.
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// The remote returned an answer payload
    Success(AskReply),
    /// The server responded with a non-success status
    RemoteFailure {
        /// HTTP status code returned by the server
        status: u16,
    },
    /// The deadline elapsed (or the exchange was cancelled) before a
    /// response arrived
    Timeout,
    /// No response could be obtained at all
    TransportFailure {
        /// Underlying failure detail, when available
        detail: String,
    },
}

/// Owns the registry and executes sends with per-session mutual exclusion
///
/// State lives behind `std::sync::Mutex` guards that are never held across
/// an await point; the network call is the only suspension.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use medichat::auth::StaticAuthGate;
/// use medichat::engine::ChatEngine;
/// use medichat::remote::HttpSessionClient;
///
/// # async fn example() -> medichat::error::Result<()> {
/// let auth = Arc::new(StaticAuthGate::new("token"));
/// let client = HttpSessionClient::new("http://localhost:8000".parse()?, auth.clone())?;
/// let engine = ChatEngine::new(client, auth);
/// engine.bootstrap().await?;
/// let outcome = engine.send("What are the symptoms of flu?", None).await?;
/// # Ok(())
/// # }
/// ```
pub struct ChatEngine<C> {
    client: C,
    auth: Arc<dyn AuthGate>,
    registry: Mutex<SessionRegistry>,
    // One cancellation token per session with an exchange in flight.
    pending: Mutex<HashMap<String, CancellationToken>>,
    send_timeout: Duration,
}

impl<C: RemoteSessionClient> ChatEngine<C> {
    /// Creates an engine with the default 60-second send deadline
    pub fn new(client: C, auth: Arc<dyn AuthGate>) -> Self {
        Self::with_timeout(client, auth, DEFAULT_SEND_TIMEOUT)
    }

    /// Creates an engine with a custom send deadline
    pub fn with_timeout(client: C, auth: Arc<dyn AuthGate>, send_timeout: Duration) -> Self {
        Self {
            client,
            auth,
            registry: Mutex::new(SessionRegistry::new()),
            pending: Mutex::new(HashMap::new()),
            send_timeout,
        }
    }

    /// Loads the session list from the remote store and activates a session
    ///
    /// If the remote reports zero sessions, exactly one default session is
    /// minted server-side and activated, so the caller never observes an
    /// empty session list. Otherwise the first listed session is selected
    /// and its history hydrated.
    ///
    /// # Errors
    ///
    /// Propagates remote failures; the registry is left empty in that case.
    pub async fn bootstrap(&self) -> Result<()> {
        let summaries = self.client.list_sessions().await?;

        if summaries.is_empty() {
            self.create_session(DEFAULT_SESSION_TITLE).await?;
            return Ok(());
        }

        let first_id = summaries[0].id.clone();
        {
            let mut registry = self.registry.lock().expect("registry lock poisoned");
            for summary in summaries {
                registry.insert(ChatSession::from_summary(summary));
            }
        }
        self.select_session(&first_id).await
    }

    /// Mints a new session server-side, inserts it, and makes it active
    ///
    /// # Errors
    ///
    /// On remote failure the registry is unchanged and no partial session
    /// exists.
    pub async fn create_session(&self, title: &str) -> Result<String> {
        let created = self.client.create_session(title).await?;
        let id = created.session_id;

        let mut registry = self.registry.lock().expect("registry lock poisoned");
        registry.insert(ChatSession::new(id.clone(), title));
        registry.activate(&id)?;
        Ok(id)
    }

    /// Activates a session and hydrates its history from the remote store
    ///
    /// Hydration only fills sessions whose local copy has no messages, so
    /// optimistic local state is never clobbered by a refresh.
    ///
    /// # Errors
    ///
    /// Returns `MedichatError::UnknownSession` for an id not in the
    /// registry; propagates remote failures from hydration.
    pub async fn select_session(&self, id: &str) -> Result<()> {
        let needs_hydration = {
            let mut registry = self.registry.lock().expect("registry lock poisoned");
            registry.activate(id)?;
            registry
                .session(id)
                .map(|s| s.messages.is_empty())
                .unwrap_or(false)
        };

        if needs_hydration {
            let history = self.client.get_session(id).await?;
            let mut registry = self.registry.lock().expect("registry lock poisoned");
            if let Some(session) = registry.session_mut(id) {
                if session.messages.is_empty() && !history.messages.is_empty() {
                    session.messages = history.messages;
                    session.title_derived = true;
                }
            }
        }

        Ok(())
    }

    /// Returns ordered session summaries
    pub fn summaries(&self) -> Vec<SessionSummary> {
        self.registry
            .lock()
            .expect("registry lock poisoned")
            .summaries()
    }

    /// Returns the id of the active session, if one is set
    pub fn active_id(&self) -> Option<String> {
        self.registry
            .lock()
            .expect("registry lock poisoned")
            .active_id()
            .map(String::from)
    }

    /// Returns a snapshot of a session's messages
    ///
    /// # Errors
    ///
    /// Returns `MedichatError::UnknownSession` if the session is absent.
    pub fn messages(&self, session_id: &str) -> Result<Vec<ChatMessage>> {
        let registry = self.registry.lock().expect("registry lock poisoned");
        registry
            .session(session_id)
            .map(|s| s.messages.clone())
            .ok_or_else(|| MedichatError::UnknownSession(session_id.to_string()).into())
    }

    /// Executes one send for the currently active session
    ///
    /// The optimistic user message is appended before the network call, so
    /// it is always visible before the corresponding assistant or synthetic
    /// message. Whatever the outcome, the pending exchange is cleared and
    /// the confirmed messages are forwarded to the durable store
    /// best-effort (forwarding failures are logged, never rolled back).
    ///
    /// # Errors
    ///
    /// * `MedichatError::Unauthenticated` - no bearer credential available
    /// * `MedichatError::NothingToSend` - empty text and no attachment
    /// * `MedichatError::NoActiveSession` - no session is active
    /// * `MedichatError::SendInProgress` - an exchange is already in flight
    ///   for the active session
    ///
    /// Remote, timeout, and transport failures are not errors; they are
    /// reported through the returned [`SendOutcome`] and as a synthetic
    /// assistant message in the session.
    pub async fn send(&self, text: &str, attachment: Option<Attachment>) -> Result<SendOutcome> {
        if self.auth.bearer_token().is_none() {
            return Err(MedichatError::Unauthenticated.into());
        }
        if text.is_empty() && attachment.is_none() {
            return Err(MedichatError::NothingToSend.into());
        }
        let session_id = self
            .active_id()
            .ok_or(MedichatError::NoActiveSession)?;

        let cancel = CancellationToken::new();
        {
            let mut pending = self.pending.lock().expect("pending lock poisoned");
            if pending.contains_key(&session_id) {
                return Err(MedichatError::SendInProgress(session_id).into());
            }
            pending.insert(session_id.clone(), cancel.clone());
        }

        let result = self.dispatch(&session_id, text, attachment, &cancel).await;

        self.pending
            .lock()
            .expect("pending lock poisoned")
            .remove(&session_id);

        result
    }

    /// Cancels the in-flight exchange for a session, if any
    ///
    /// Idempotent: cancelling an already-completed or unknown exchange is a
    /// no-op. The cancelled send resolves with [`SendOutcome::Timeout`].
    pub fn cancel(&self, session_id: &str) {
        let pending = self.pending.lock().expect("pending lock poisoned");
        if let Some(token) = pending.get(session_id) {
            token.cancel();
        }
    }

    /// Returns true when an exchange is in flight for the session
    pub fn is_pending(&self, session_id: &str) -> bool {
        self.pending
            .lock()
            .expect("pending lock poisoned")
            .contains_key(session_id)
    }

    /// Body of one send, run with the pending slot held
    async fn dispatch(
        &self,
        session_id: &str,
        text: &str,
        attachment: Option<Attachment>,
        cancel: &CancellationToken,
    ) -> Result<SendOutcome> {
        let mut user_msg =
            ChatMessage::user(text, attachment.as_ref().map(|a| a.file_name.clone()));
        {
            let mut registry = self.registry.lock().expect("registry lock poisoned");
            reconcile::apply_optimistic_user(&mut registry, session_id, user_msg.clone())?;
        }

        let started = Instant::now();

        // First completed branch wins; the losing future is dropped, so a
        // late response after the deadline cannot produce a second message.
        let outcome = tokio::select! {
            result = self.client.ask(text, attachment.as_ref()) => Self::classify(result),
            _ = cancel.cancelled() => SendOutcome::Timeout,
            _ = tokio::time::sleep(self.send_timeout) => {
                cancel.cancel();
                SendOutcome::Timeout
            }
        };

        let assistant = match &outcome {
            SendOutcome::Success(reply) => {
                if let Some(path) = &reply.file_path {
                    user_msg.file_path = Some(path.clone());
                    let mut registry = self.registry.lock().expect("registry lock poisoned");
                    reconcile::attach_file_path(&mut registry, session_id, path)?;
                }
                ChatMessage::ai(reply.result.clone())
            }
            SendOutcome::RemoteFailure { status } => {
                tracing::warn!(session = %session_id, status, "remote answered with error status");
                ChatMessage::ai(format!(
                    "Error: Unable to get response from AI (status {}).",
                    status
                ))
            }
            SendOutcome::Timeout => {
                tracing::warn!(
                    session = %session_id,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "send timed out or was cancelled"
                );
                ChatMessage::ai(format!(
                    "Request timed out after {} seconds. Please try again.",
                    self.send_timeout.as_secs()
                ))
            }
            SendOutcome::TransportFailure { detail } => {
                tracing::warn!(session = %session_id, detail = %detail, "transport failure");
                ChatMessage::ai(format!("Network error: {}", detail))
            }
        };

        {
            let mut registry = self.registry.lock().expect("registry lock poisoned");
            reconcile::apply_outcome(&mut registry, session_id, assistant.clone())?;
        }

        self.forward_durable(session_id, &user_msg, &assistant).await;

        Ok(outcome)
    }

    /// Maps an `ask` result into the outcome sum type
    fn classify(result: Result<AskReply>) -> SendOutcome {
        match result {
            Ok(reply) => SendOutcome::Success(reply),
            Err(err) => match err.downcast_ref::<MedichatError>() {
                Some(MedichatError::RemoteStatus { status }) => {
                    SendOutcome::RemoteFailure { status: *status }
                }
                Some(MedichatError::Transport(detail)) => SendOutcome::TransportFailure {
                    detail: detail.clone(),
                },
                _ => SendOutcome::TransportFailure {
                    detail: err.to_string(),
                },
            },
        }
    }

    /// Forwards the confirmed exchange to the durable store, best-effort
    ///
    /// The in-memory session is the source of truth for the UI; a failure
    /// here is logged and never rolls back the appends.
    async fn forward_durable(
        &self,
        session_id: &str,
        user_msg: &ChatMessage,
        assistant: &ChatMessage,
    ) {
        for message in [user_msg, assistant] {
            if let Err(err) = self.client.append_message(session_id, message).await {
                tracing::warn!(
                    session = %session_id,
                    error = %err,
                    "failed to persist message to remote store"
                );
            }
        }
    }
}
