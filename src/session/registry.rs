//! Ordered registry of chat sessions and the active pointer
//!
//! The registry owns session state and nothing else: no network calls, no
//! title policy. Message-sequence mutations arrive only through the
//! reconciler, which keeps append-only semantics in one place.
//!
//! Invariant: the active id, when set, always references a session present
//! in the registry. `activate` is the only way to set it and rejects
//! unknown ids.

use crate::error::{MedichatError, Result};
use crate::session::types::{ChatMessage, ChatSession, SessionSummary};

/// Holds the ordered set of chat sessions and which one is active
///
/// # Examples
///
/// ```
/// use medichat::session::{ChatSession, SessionRegistry};
///
/// let mut registry = SessionRegistry::new();
/// registry.insert(ChatSession::new("s1", "New Chat"));
/// registry.activate("s1").unwrap();
/// assert_eq!(registry.active_id(), Some("s1"));
/// ```
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Vec<ChatSession>,
    active: Option<String>,
}

impl SessionRegistry {
    /// Creates an empty registry with no active session
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns ordered session summaries, without message bodies
    pub fn summaries(&self) -> Vec<SessionSummary> {
        self.sessions.iter().map(ChatSession::summary).collect()
    }

    /// Returns the number of sessions held
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns true when the registry holds no sessions
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Sets the active pointer
    ///
    /// # Errors
    ///
    /// Returns `MedichatError::UnknownSession` if no session with the given
    /// id is present; the active pointer is left unchanged in that case.
    pub fn activate(&mut self, id: &str) -> Result<()> {
        if self.session(id).is_none() {
            return Err(MedichatError::UnknownSession(id.to_string()).into());
        }
        self.active = Some(id.to_string());
        Ok(())
    }

    /// Returns the id of the active session, if one is set
    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Inserts a session at the end of the ordering
    ///
    /// Does not change the active pointer; callers activate explicitly.
    pub fn insert(&mut self, session: ChatSession) {
        self.sessions.push(session);
    }

    /// Looks up a session by id
    pub fn session(&self, id: &str) -> Option<&ChatSession> {
        self.sessions.iter().find(|s| s.id == id)
    }

    /// Mutable session lookup, restricted to the crate so all message
    /// mutations flow through the reconciler
    pub(crate) fn session_mut(&mut self, id: &str) -> Option<&mut ChatSession> {
        self.sessions.iter_mut().find(|s| s.id == id)
    }

    /// Appends a message to a session's sequence
    ///
    /// # Errors
    ///
    /// Returns `MedichatError::UnknownSession` if the session is not
    /// present; no state changes in that case.
    pub fn append_message(&mut self, id: &str, message: ChatMessage) -> Result<()> {
        match self.session_mut(id) {
            Some(session) => {
                session.messages.push(message);
                Ok(())
            }
            None => Err(MedichatError::UnknownSession(id.to_string()).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_is_empty() {
        let registry = SessionRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(registry.active_id().is_none());
    }

    #[test]
    fn test_insert_preserves_order() {
        let mut registry = SessionRegistry::new();
        registry.insert(ChatSession::new("s1", "First"));
        registry.insert(ChatSession::new("s2", "Second"));

        let summaries = registry.summaries();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].id, "s1");
        assert_eq!(summaries[1].id, "s2");
    }

    #[test]
    fn test_activate_unknown_session_fails() {
        let mut registry = SessionRegistry::new();
        let err = registry.activate("nope").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MedichatError>(),
            Some(MedichatError::UnknownSession(_))
        ));
        assert!(registry.active_id().is_none());
    }

    #[test]
    fn test_activate_sets_pointer() {
        let mut registry = SessionRegistry::new();
        registry.insert(ChatSession::new("s1", "New Chat"));
        registry.insert(ChatSession::new("s2", "New Chat"));

        registry.activate("s2").unwrap();
        assert_eq!(registry.active_id(), Some("s2"));

        registry.activate("s1").unwrap();
        assert_eq!(registry.active_id(), Some("s1"));
    }

    #[test]
    fn test_append_message_unknown_session_is_noop() {
        let mut registry = SessionRegistry::new();
        registry.insert(ChatSession::new("s1", "New Chat"));

        let err = registry
            .append_message("ghost", ChatMessage::user("hello", None))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MedichatError>(),
            Some(MedichatError::UnknownSession(_))
        ));
        assert!(registry.session("s1").unwrap().messages.is_empty());
    }

    #[test]
    fn test_append_message_grows_sequence() {
        let mut registry = SessionRegistry::new();
        registry.insert(ChatSession::new("s1", "New Chat"));

        registry
            .append_message("s1", ChatMessage::user("first", None))
            .unwrap();
        registry
            .append_message("s1", ChatMessage::ai("second"))
            .unwrap();

        let session = registry.session("s1").unwrap();
        assert_eq!(session.messages.len(), 2);
        assert_eq!(session.messages[0].text, "first");
        assert_eq!(session.messages[1].text, "second");
    }

    #[test]
    fn test_summaries_exclude_message_bodies() {
        let mut registry = SessionRegistry::new();
        registry.insert(ChatSession::new("s1", "New Chat"));
        registry
            .append_message("s1", ChatMessage::user("secret", None))
            .unwrap();

        let summaries = registry.summaries();
        assert_eq!(summaries[0].title, "New Chat");
    }
}
