//! HTTP implementation of the remote session client
//!
//! Speaks the backend's REST surface:
//!
//! - `GET  /chat/sessions`                → session summaries
//! - `POST /chat/sessions`               → mint a session
//! - `GET  /chat/sessions/{id}`          → full message history
//! - `POST /chat/ask`                    → multipart question + optional file
//! - `POST /chat/sessions/{id}/messages` → durable append
//!
//! Failure classification: errors from `send()` (DNS, connection refused)
//! become `MedichatError::Transport`; non-2xx statuses become
//! `MedichatError::RemoteStatus`; body decode failures on a 2xx response
//! become `MedichatError::Http`. The dispatcher relies on this split to
//! pick the right synthetic message.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart;
use reqwest::Client;
use serde_json::json;
use url::Url;

use crate::auth::AuthGate;
use crate::error::{MedichatError, Result};
use crate::remote::{AskReply, CreatedSession, RemoteSessionClient, SessionMessages};
use crate::session::{Attachment, ChatMessage, SessionSummary};

/// Generous client-level timeout; the dispatch deadline is enforced by the
/// engine, not here
const CLIENT_TIMEOUT: Duration = Duration::from_secs(120);

/// Remote session client backed by `reqwest`
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use medichat::auth::StaticAuthGate;
/// use medichat::remote::HttpSessionClient;
///
/// # fn main() -> medichat::error::Result<()> {
/// let auth = Arc::new(StaticAuthGate::new("token"));
/// let client = HttpSessionClient::new("http://localhost:8000".parse()?, auth)?;
/// # Ok(())
/// # }
/// ```
pub struct HttpSessionClient {
    client: Client,
    base_url: Url,
    auth: Arc<dyn AuthGate>,
}

impl HttpSessionClient {
    /// Creates a client for the given base URL
    ///
    /// # Errors
    ///
    /// Returns an error if HTTP client initialization fails.
    pub fn new(base_url: Url, auth: Arc<dyn AuthGate>) -> Result<Self> {
        let client = Client::builder()
            .timeout(CLIENT_TIMEOUT)
            .user_agent(concat!("medichat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                MedichatError::Config(format!("Failed to create HTTP client: {}", e))
            })?;

        tracing::info!(base_url = %base_url, "Initialized session client");

        Ok(Self {
            client,
            base_url,
            auth,
        })
    }

    fn bearer(&self) -> Result<String> {
        self.auth
            .bearer_token()
            .ok_or_else(|| MedichatError::Unauthenticated.into())
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| MedichatError::Config(format!("Invalid endpoint {}: {}", path, e)).into())
    }

    /// Promotes a non-success status into `RemoteStatus`
    fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(MedichatError::RemoteStatus {
                status: status.as_u16(),
            }
            .into())
        }
    }

    fn transport(err: reqwest::Error) -> anyhow::Error {
        MedichatError::Transport(err.to_string()).into()
    }
}

#[async_trait]
impl RemoteSessionClient for HttpSessionClient {
    async fn list_sessions(&self) -> Result<Vec<SessionSummary>> {
        let token = self.bearer()?;
        let response = self
            .client
            .get(self.endpoint("/chat/sessions")?)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(Self::transport)?;

        let response = Self::check_status(response)?;
        let summaries = response.json().await.map_err(MedichatError::Http)?;
        Ok(summaries)
    }

    async fn create_session(&self, title: &str) -> Result<CreatedSession> {
        let token = self.bearer()?;
        let response = self
            .client
            .post(self.endpoint("/chat/sessions")?)
            .bearer_auth(&token)
            .json(&json!({ "title": title }))
            .send()
            .await
            .map_err(Self::transport)?;

        let response = Self::check_status(response)?;
        let created = response.json().await.map_err(MedichatError::Http)?;
        Ok(created)
    }

    async fn get_session(&self, id: &str) -> Result<SessionMessages> {
        let token = self.bearer()?;
        let response = self
            .client
            .get(self.endpoint(&format!("/chat/sessions/{}", id))?)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(Self::transport)?;

        let response = Self::check_status(response)?;
        let messages = response.json().await.map_err(MedichatError::Http)?;
        Ok(messages)
    }

    async fn ask(&self, question: &str, file: Option<&Attachment>) -> Result<AskReply> {
        let token = self.bearer()?;

        let mut form = multipart::Form::new().text("question", question.to_string());
        if let Some(attachment) = file {
            let part = multipart::Part::bytes(attachment.bytes.clone())
                .file_name(attachment.file_name.clone());
            form = form.part("file", part);
        }

        let response = self
            .client
            .post(self.endpoint("/chat/ask")?)
            .bearer_auth(&token)
            .multipart(form)
            .send()
            .await
            .map_err(Self::transport)?;

        let response = Self::check_status(response)?;
        let reply = response.json().await.map_err(MedichatError::Http)?;
        Ok(reply)
    }

    async fn append_message(&self, session_id: &str, message: &ChatMessage) -> Result<()> {
        let token = self.bearer()?;
        let response = self
            .client
            .post(self.endpoint(&format!("/chat/sessions/{}/messages", session_id))?)
            .bearer_auth(&token)
            .json(message)
            .send()
            .await
            .map_err(Self::transport)?;

        Self::check_status(response)?;
        Ok(())
    }
}
