//! Outbound mail delivery.
//!
//! A `Mailer` performs exactly one send attempt per call and reports the
//! outcome as a typed result. Turning that outcome into user-facing text is
//! the caller's job.

pub mod smtp;

use async_trait::async_trait;

use crate::error::DeliveryError;

pub use smtp::SmtpMailer;

/// Fixed subject line for relayed messages.
pub const RELAY_SUBJECT: &str = "Message from Telegram bot";

/// A single message to relay. Constructed per send, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryRequest {
    pub destination: String,
    pub body: String,
}

impl DeliveryRequest {
    pub fn new(destination: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            body: body.into(),
        }
    }
}

/// One-shot outbound mail sender.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Attempt to deliver `request`. No retries.
    async fn send(&self, request: &DeliveryRequest) -> Result<(), DeliveryError>;
}
