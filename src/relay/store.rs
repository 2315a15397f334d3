//! Session store — per-user sessions keyed by user identity.
//!
//! Owned by the controller and only touched from the serial relay loop, so
//! it needs no locking. Nothing is persisted; a restart drops every session.

use std::collections::HashMap;

use super::state::ConversationStep;

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<String, ConversationStep>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh session for `user_id`, replacing any existing one.
    pub fn create(&mut self, user_id: &str) -> &ConversationStep {
        self.sessions
            .insert(user_id.to_string(), ConversationStep::AwaitingEmail);
        &self.sessions[user_id]
    }

    pub fn get(&self, user_id: &str) -> Option<&ConversationStep> {
        self.sessions.get(user_id)
    }

    /// Move an existing session to `step`. Returns `false` if the user has no session.
    pub fn update(&mut self, user_id: &str, step: ConversationStep) -> bool {
        match self.sessions.get_mut(user_id) {
            Some(current) => {
                *current = step;
                true
            }
            None => false,
        }
    }

    /// Drop the user's session, returning it to the initial state.
    pub fn clear(&mut self, user_id: &str) -> Option<ConversationStep> {
        self.sessions.remove(user_id)
    }

    /// Number of users currently mid-form.
    pub fn count(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_starts_at_awaiting_email() {
        let mut store = SessionStore::new();
        assert_eq!(store.create("42"), &ConversationStep::AwaitingEmail);
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn create_replaces_existing_session() {
        let mut store = SessionStore::new();
        store.create("42");
        store.update(
            "42",
            ConversationStep::AwaitingMessage {
                email: "user@example.com".into(),
            },
        );
        store.create("42");
        assert_eq!(store.get("42"), Some(&ConversationStep::AwaitingEmail));
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn update_moves_existing_session() {
        let mut store = SessionStore::new();
        store.create("42");
        let step = ConversationStep::AwaitingMessage {
            email: "user@example.com".into(),
        };
        assert!(store.update("42", step.clone()));
        assert_eq!(store.get("42"), Some(&step));
    }

    #[test]
    fn update_without_session_is_a_noop() {
        let mut store = SessionStore::new();
        assert!(!store.update("42", ConversationStep::AwaitingEmail));
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn clear_removes_only_that_user() {
        let mut store = SessionStore::new();
        store.create("1");
        store.create("2");
        assert!(store.clear("1").is_some());
        assert!(store.get("1").is_none());
        assert!(store.get("2").is_some());
        assert!(store.clear("1").is_none());
    }
}
