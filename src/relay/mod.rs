//! Relay — connects a chat channel to the conversation controller.
//!
//! Events are handled one at a time in arrival order. A delivery in progress
//! holds up every later event, for all users, until it finishes.

pub mod controller;
pub mod prompts;
pub mod state;
pub mod store;

use std::sync::Arc;

use futures::StreamExt;

use crate::channels::{Channel, IncomingMessage, OutgoingResponse};
use crate::delivery::Mailer;
use crate::error::Result;

pub use controller::{Controller, parse_email};
pub use state::ConversationStep;
pub use store::SessionStore;

/// Serial event loop over a single channel.
pub struct Relay {
    channel: Arc<dyn Channel>,
    controller: Controller,
}

impl Relay {
    pub fn new(channel: Arc<dyn Channel>, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            channel,
            controller: Controller::new(mailer),
        }
    }

    /// Consume the channel's messages until its stream ends.
    pub async fn run(mut self) -> Result<()> {
        let mut stream = self.channel.start().await?;
        tracing::info!(channel = %self.channel.name(), "Relay started");

        while let Some(msg) = stream.next().await {
            self.handle_message(&msg).await;
        }

        tracing::info!(channel = %self.channel.name(), "Message stream ended");
        Ok(())
    }

    async fn handle_message(&mut self, msg: &IncomingMessage) {
        let queued_ms = (chrono::Utc::now() - msg.received_at).num_milliseconds();
        tracing::debug!(
            message_id = %msg.id,
            user_id = %msg.user_id,
            user_name = msg.user_name.as_deref().unwrap_or("-"),
            channel = %msg.channel,
            queued_ms,
            step = ?self.controller.step(&msg.user_id),
            active_sessions = self.controller.active_sessions(),
            "Incoming message"
        );

        let Some(reply) = self.controller.handle(&msg.user_id, &msg.content).await else {
            return;
        };

        if let Err(e) = self
            .channel
            .respond(msg, OutgoingResponse::text(reply))
            .await
        {
            tracing::error!(user_id = %msg.user_id, "Failed to send reply: {e}");
        }
    }
}
