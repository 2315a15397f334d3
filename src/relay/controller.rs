//! Conversation controller — drives the two-step email form.
//!
//! ```text
//! (any)            --/start-->          AwaitingEmail     [greeting]
//! Initial          --text-->            Initial           [ignored]
//! AwaitingEmail    --valid address-->   AwaitingMessage   [accepted]
//! AwaitingEmail    --anything else-->   AwaitingEmail     [re-prompt]
//! AwaitingMessage  --text-->            Initial           [delivery outcome]
//! ```

use std::sync::Arc;

use lettre::message::Mailbox;

use super::prompts;
use super::state::ConversationStep;
use super::store::SessionStore;
use crate::delivery::{DeliveryRequest, Mailer};

/// Command that (re)starts the form.
const START_COMMAND: &str = "start";

/// What an inbound text means to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input<'a> {
    Start,
    Text(&'a str),
}

impl<'a> Input<'a> {
    /// Recognises `/start`, `/start@botname`, and `/start <payload>`.
    fn parse(text: &'a str) -> Self {
        let is_start = text
            .trim()
            .strip_prefix('/')
            .and_then(|rest| rest.split_whitespace().next())
            .map(|cmd| cmd.split('@').next() == Some(START_COMMAND))
            .unwrap_or(false);

        if is_start {
            Self::Start
        } else {
            Self::Text(text)
        }
    }
}

/// Validate an address's syntax, returning it trimmed.
///
/// Goes through the same `Mailbox` parse the SMTP adapter applies to the
/// destination, so anything accepted here can be addressed. Display names,
/// quoted local parts, domain literals and single-label domains are rejected.
pub fn parse_email(input: &str) -> Option<String> {
    let trimmed = input.trim();
    let mailbox: Mailbox = trimmed.parse().ok()?;
    if mailbox.name.is_some() {
        return None;
    }

    let address = mailbox.email;
    if address.to_string() != trimmed {
        return None;
    }

    let domain = address.domain();
    let has_dotted_hostname = !domain.starts_with('[')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty());

    has_dotted_hostname.then(|| trimmed.to_string())
}

/// Per-user form state machine.
pub struct Controller {
    sessions: SessionStore,
    mailer: Arc<dyn Mailer>,
}

impl Controller {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self {
            sessions: SessionStore::new(),
            mailer,
        }
    }

    /// The user's current step; `None` means the initial state.
    pub fn step(&self, user_id: &str) -> Option<&ConversationStep> {
        self.sessions.get(user_id)
    }

    /// Number of users currently mid-form.
    pub fn active_sessions(&self) -> usize {
        self.sessions.count()
    }

    /// Feed one inbound text from `user_id` through the state machine.
    ///
    /// Returns the reply to send, or `None` when the text is ignored. A
    /// delivery is awaited before returning, so callers handling events
    /// serially never interleave two steps of the same user.
    pub async fn handle(&mut self, user_id: &str, text: &str) -> Option<String> {
        let current = self.sessions.get(user_id).cloned();

        match (current, Input::parse(text)) {
            (_, Input::Start) => {
                self.sessions.create(user_id);
                tracing::debug!(user_id = %user_id, "Session started");
                Some(prompts::GREETING.to_string())
            }

            (None, Input::Text(_)) => {
                tracing::debug!(user_id = %user_id, "Ignoring text outside a session");
                None
            }

            (Some(ConversationStep::AwaitingEmail), Input::Text(input)) => {
                match parse_email(input) {
                    Some(email) => {
                        tracing::debug!(user_id = %user_id, email = %email, "Email accepted");
                        self.sessions
                            .update(user_id, ConversationStep::AwaitingMessage { email });
                        Some(prompts::EMAIL_ACCEPTED.to_string())
                    }
                    None => Some(prompts::INVALID_EMAIL.to_string()),
                }
            }

            (Some(ConversationStep::AwaitingMessage { email }), Input::Text(body)) => {
                let request = DeliveryRequest::new(email, body);
                let outcome = self.mailer.send(&request).await;
                self.sessions.clear(user_id);

                match outcome {
                    Ok(()) => Some(prompts::DELIVERY_SUCCEEDED.to_string()),
                    Err(e) => {
                        tracing::warn!(
                            user_id = %user_id,
                            destination = %request.destination,
                            error = %e,
                            "Delivery failed"
                        );
                        Some(prompts::delivery_failed(&e))
                    }
                }
            }
        }
    }
}
