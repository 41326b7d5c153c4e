//! Shared test support: an in-process fake of the remote session client
//!
//! The fake mints sequential session ids, records every ask and durable
//! append, and answers asks according to a configurable [`AskBehavior`].
//! `Hang` parks the ask on a `Notify` so tests can hold an exchange in
//! flight without depending on wall-clock timing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use medichat::error::{MedichatError, Result};
use medichat::remote::{AskReply, CreatedSession, RemoteSessionClient, SessionMessages};
use medichat::session::{Attachment, ChatMessage, SessionSummary};

/// How the fake answers the next ask
#[derive(Debug, Clone)]
pub enum AskBehavior {
    /// Answer immediately with this payload
    Reply {
        result: String,
        file_path: Option<String>,
    },
    /// Fail with a server status
    Status(u16),
    /// Fail with a transport-level error
    Transport(String),
    /// Park until [`FakeSessionClient::release_ask`] is called, then answer
    /// with `"answer to {question}"`
    Hang,
}

/// In-process fake remote session client
pub struct FakeSessionClient {
    summaries: Mutex<Vec<SessionSummary>>,
    histories: Mutex<HashMap<String, Vec<ChatMessage>>>,
    next_id: AtomicUsize,
    behavior: Mutex<AskBehavior>,
    release: Arc<Notify>,
    append_fails: AtomicBool,
    pub asks: Mutex<Vec<String>>,
    pub appended: Mutex<Vec<(String, ChatMessage)>>,
}

#[allow(dead_code)]
impl FakeSessionClient {
    /// Creates a fake with no sessions and an immediate canned reply
    pub fn new() -> Self {
        Self {
            summaries: Mutex::new(Vec::new()),
            histories: Mutex::new(HashMap::new()),
            next_id: AtomicUsize::new(1),
            behavior: Mutex::new(AskBehavior::Reply {
                result: "canned answer".to_string(),
                file_path: None,
            }),
            release: Arc::new(Notify::new()),
            append_fails: AtomicBool::new(false),
            asks: Mutex::new(Vec::new()),
            appended: Mutex::new(Vec::new()),
        }
    }

    /// Pre-seeds a session summary (and optional history) before bootstrap
    pub fn seed_session(&self, id: &str, title: &str, messages: Vec<ChatMessage>) {
        self.summaries.lock().unwrap().push(SessionSummary {
            id: id.to_string(),
            title: title.to_string(),
            created_at: "2025-01-01T00:00:00+00:00".to_string(),
        });
        self.histories
            .lock()
            .unwrap()
            .insert(id.to_string(), messages);
    }

    /// Sets how subsequent asks behave
    pub fn set_behavior(&self, behavior: AskBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    /// Releases one ask parked by [`AskBehavior::Hang`]
    pub fn release_ask(&self) {
        self.release.notify_one();
    }

    /// Makes durable appends fail from now on
    pub fn fail_appends(&self) {
        self.append_fails.store(true, Ordering::SeqCst);
    }

    /// Number of sessions created through the fake
    pub fn created_count(&self) -> usize {
        self.next_id.load(Ordering::SeqCst) - 1
    }
}

#[async_trait]
impl RemoteSessionClient for FakeSessionClient {
    async fn list_sessions(&self) -> Result<Vec<SessionSummary>> {
        Ok(self.summaries.lock().unwrap().clone())
    }

    async fn create_session(&self, title: &str) -> Result<CreatedSession> {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let id = format!("s{}", n);
        self.summaries.lock().unwrap().push(SessionSummary {
            id: id.clone(),
            title: title.to_string(),
            created_at: "2025-01-01T00:00:00+00:00".to_string(),
        });
        Ok(CreatedSession { session_id: id })
    }

    async fn get_session(&self, id: &str) -> Result<SessionMessages> {
        let histories = self.histories.lock().unwrap();
        match histories.get(id) {
            Some(messages) => Ok(SessionMessages {
                messages: messages.clone(),
            }),
            None => Ok(SessionMessages { messages: vec![] }),
        }
    }

    async fn ask(&self, question: &str, _file: Option<&Attachment>) -> Result<AskReply> {
        self.asks.lock().unwrap().push(question.to_string());
        let behavior = self.behavior.lock().unwrap().clone();
        match behavior {
            AskBehavior::Reply { result, file_path } => Ok(AskReply { result, file_path }),
            AskBehavior::Status(status) => Err(MedichatError::RemoteStatus { status }.into()),
            AskBehavior::Transport(detail) => Err(MedichatError::Transport(detail).into()),
            AskBehavior::Hang => {
                self.release.notified().await;
                Ok(AskReply {
                    result: format!("answer to {}", question),
                    file_path: None,
                })
            }
        }
    }

    async fn append_message(&self, session_id: &str, message: &ChatMessage) -> Result<()> {
        if self.append_fails.load(Ordering::SeqCst) {
            return Err(MedichatError::RemoteStatus { status: 500 }.into());
        }
        self.appended
            .lock()
            .unwrap()
            .push((session_id.to_string(), message.clone()));
        Ok(())
    }
}
