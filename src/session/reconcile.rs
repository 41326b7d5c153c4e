//! Reconciliation of dispatch outcomes into the session registry
//!
//! Single choke-point for all mutations to a session's message sequence.
//! Reconciliation only appends; the one exception is attaching a
//! late-arriving server file path onto the most recent user message of the
//! same exchange.
//!
//! Title derivation happens here, at the optimistic-append moment: the
//! first time a session goes from zero to one message, the title is derived
//! from the user text and latched. Deriving against the registry state at
//! append time (rather than a snapshot captured before the send started)
//! keeps the rule correct under concurrent sends on other sessions.

use crate::error::Result;
use crate::session::registry::SessionRegistry;
use crate::session::types::{ChatMessage, Sender, DEFAULT_SESSION_TITLE};

/// Maximum number of characters kept when deriving a title
pub const TITLE_MAX_CHARS: usize = 20;

/// Appends the optimistic user message and derives the title if this is
/// the session's first message
///
/// Synchronous from the caller's perspective; no network wait. The title is
/// derived at most once per session and only while the session still
/// carries the default placeholder title; an explicitly chosen title is
/// kept. An attachment-only message (empty text) consumes the derivation
/// slot without changing the title.
///
/// # Errors
///
/// Returns `MedichatError::UnknownSession` if the session is not present.
pub fn apply_optimistic_user(
    registry: &mut SessionRegistry,
    session_id: &str,
    message: ChatMessage,
) -> Result<()> {
    let derive = registry
        .session(session_id)
        .map(|s| s.messages.is_empty() && !s.title_derived)
        .unwrap_or(false);

    let text = message.text.clone();
    registry.append_message(session_id, message)?;

    if derive {
        // Lookup cannot fail: the append above proved the session exists.
        if let Some(session) = registry.session_mut(session_id) {
            if !text.is_empty() && session.title == DEFAULT_SESSION_TITLE {
                session.title = derive_title(&text);
            }
            session.title_derived = true;
        }
    }

    Ok(())
}

/// Appends the assistant (or synthetic failure) message for an exchange
///
/// # Errors
///
/// Returns `MedichatError::UnknownSession` if the session is not present.
pub fn apply_outcome(
    registry: &mut SessionRegistry,
    session_id: &str,
    message: ChatMessage,
) -> Result<()> {
    registry.append_message(session_id, message)
}

/// Attaches a server-resolved file path to the most recent user message
///
/// Called when a successful ask reply carries the storage path for the file
/// uploaded with the exchange. A session with no user message is left
/// untouched.
///
/// # Errors
///
/// Returns `MedichatError::UnknownSession` if the session is not present.
pub fn attach_file_path(
    registry: &mut SessionRegistry,
    session_id: &str,
    file_path: &str,
) -> Result<()> {
    use crate::error::MedichatError;

    let session = registry
        .session_mut(session_id)
        .ok_or_else(|| MedichatError::UnknownSession(session_id.to_string()))?;

    if let Some(message) = session
        .messages
        .iter_mut()
        .rev()
        .find(|m| m.sender == Sender::User)
    {
        message.file_path = Some(file_path.to_string());
    }

    Ok(())
}

/// Derives a session title from user text: the first [`TITLE_MAX_CHARS`]
/// characters, with an ellipsis marker when truncated
fn derive_title(text: &str) -> String {
    if text.chars().count() <= TITLE_MAX_CHARS {
        text.to_string()
    } else {
        let mut title: String = text.chars().take(TITLE_MAX_CHARS).collect();
        title.push_str("...");
        title
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::types::ChatSession;

    fn registry_with_session(id: &str) -> SessionRegistry {
        let mut registry = SessionRegistry::new();
        registry.insert(ChatSession::new(id, "New Chat"));
        registry
    }

    #[test]
    fn test_first_user_message_sets_title() {
        let mut registry = registry_with_session("s1");
        apply_optimistic_user(&mut registry, "s1", ChatMessage::user("Hello doctor", None))
            .unwrap();

        assert_eq!(registry.session("s1").unwrap().title, "Hello doctor");
    }

    #[test]
    fn test_long_title_truncated_with_ellipsis() {
        let mut registry = registry_with_session("s1");
        let text = "What are the symptoms of flu and how long does it last?";
        apply_optimistic_user(&mut registry, "s1", ChatMessage::user(text, None)).unwrap();

        assert_eq!(
            registry.session("s1").unwrap().title,
            "What are the symptom..."
        );
    }

    #[test]
    fn test_title_exactly_at_limit_not_truncated() {
        let mut registry = registry_with_session("s1");
        let text = "a".repeat(TITLE_MAX_CHARS);
        apply_optimistic_user(&mut registry, "s1", ChatMessage::user(text.clone(), None)).unwrap();

        assert_eq!(registry.session("s1").unwrap().title, text);
    }

    #[test]
    fn test_title_counts_characters_not_bytes() {
        let mut registry = registry_with_session("s1");
        let text = "é".repeat(TITLE_MAX_CHARS + 5);
        apply_optimistic_user(&mut registry, "s1", ChatMessage::user(text, None)).unwrap();

        let expected = format!("{}...", "é".repeat(TITLE_MAX_CHARS));
        assert_eq!(registry.session("s1").unwrap().title, expected);
    }

    #[test]
    fn test_attachment_only_first_message_keeps_title() {
        let mut registry = registry_with_session("s1");
        apply_optimistic_user(
            &mut registry,
            "s1",
            ChatMessage::user("", Some("scan.pdf".to_string())),
        )
        .unwrap();

        assert_eq!(registry.session("s1").unwrap().title, "New Chat");
    }

    #[test]
    fn test_explicit_title_survives_first_message() {
        let mut registry = SessionRegistry::new();
        registry.insert(ChatSession::new("s1", "Flu questions"));

        apply_optimistic_user(&mut registry, "s1", ChatMessage::user("unrelated text", None))
            .unwrap();

        let session = registry.session("s1").unwrap();
        assert_eq!(session.title, "Flu questions");
        // The derivation slot is still consumed.
        assert!(session.title_derived);
    }

    #[test]
    fn test_title_derived_at_most_once() {
        let mut registry = registry_with_session("s1");
        apply_optimistic_user(&mut registry, "s1", ChatMessage::user("first question", None))
            .unwrap();
        apply_outcome(&mut registry, "s1", ChatMessage::ai("answer")).unwrap();
        apply_optimistic_user(&mut registry, "s1", ChatMessage::user("second question", None))
            .unwrap();

        assert_eq!(registry.session("s1").unwrap().title, "first question");
    }

    #[test]
    fn test_later_messages_never_set_title_after_empty_first() {
        // The derivation slot is consumed by the 0 -> 1 transition even when
        // the first message was attachment-only.
        let mut registry = registry_with_session("s1");
        apply_optimistic_user(
            &mut registry,
            "s1",
            ChatMessage::user("", Some("scan.pdf".to_string())),
        )
        .unwrap();
        apply_optimistic_user(&mut registry, "s1", ChatMessage::user("now with text", None))
            .unwrap();

        assert_eq!(registry.session("s1").unwrap().title, "New Chat");
    }

    #[test]
    fn test_apply_outcome_appends_in_order() {
        let mut registry = registry_with_session("s1");
        apply_optimistic_user(&mut registry, "s1", ChatMessage::user("question", None)).unwrap();
        apply_outcome(&mut registry, "s1", ChatMessage::ai("answer")).unwrap();

        let messages = &registry.session("s1").unwrap().messages;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].sender, Sender::User);
        assert_eq!(messages[1].sender, Sender::Ai);
    }

    #[test]
    fn test_attach_file_path_targets_latest_user_message() {
        let mut registry = registry_with_session("s1");
        apply_optimistic_user(&mut registry, "s1", ChatMessage::user("first", None)).unwrap();
        apply_outcome(&mut registry, "s1", ChatMessage::ai("reply")).unwrap();
        apply_optimistic_user(
            &mut registry,
            "s1",
            ChatMessage::user("second", Some("scan.pdf".to_string())),
        )
        .unwrap();

        attach_file_path(&mut registry, "s1", "/uploads/scan.pdf").unwrap();

        let messages = &registry.session("s1").unwrap().messages;
        assert!(messages[0].file_path.is_none());
        assert_eq!(messages[2].file_path.as_deref(), Some("/uploads/scan.pdf"));
    }

    #[test]
    fn test_attach_file_path_never_touches_assistant_messages() {
        let mut registry = registry_with_session("s1");
        apply_optimistic_user(&mut registry, "s1", ChatMessage::user("question", None)).unwrap();
        apply_outcome(&mut registry, "s1", ChatMessage::ai("reply")).unwrap();

        attach_file_path(&mut registry, "s1", "/uploads/x.pdf").unwrap();

        let messages = &registry.session("s1").unwrap().messages;
        assert_eq!(messages[0].file_path.as_deref(), Some("/uploads/x.pdf"));
        assert!(messages[1].file_path.is_none());
    }

    #[test]
    fn test_unknown_session_rejected() {
        let mut registry = SessionRegistry::new();
        assert!(
            apply_optimistic_user(&mut registry, "ghost", ChatMessage::user("hi", None)).is_err()
        );
        assert!(apply_outcome(&mut registry, "ghost", ChatMessage::ai("hi")).is_err());
        assert!(attach_file_path(&mut registry, "ghost", "/x").is_err());
    }

    #[test]
    fn test_messages_are_append_only() {
        let mut registry = registry_with_session("s1");
        let mut lengths = Vec::new();
        for i in 0..3 {
            apply_optimistic_user(
                &mut registry,
                "s1",
                ChatMessage::user(format!("message {}", i), None),
            )
            .unwrap();
            lengths.push(registry.session("s1").unwrap().messages.len());
        }
        assert_eq!(lengths, vec![1, 2, 3]);
    }
}
