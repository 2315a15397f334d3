//! Conversation state — which step of the form a user is on.

/// The step a user's session is waiting on.
///
/// A user with no session is in the initial state. The collected address
/// lives inside `AwaitingMessage`, so that step cannot exist without one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationStep {
    AwaitingEmail,
    AwaitingMessage { email: String },
}
