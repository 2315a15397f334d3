//! User-facing texts of the relay conversation.

use std::fmt::Display;

/// Sent in reply to the start command.
pub const GREETING: &str = "Hi! Please enter your email address:";

/// Sent when the address fails syntax validation.
pub const INVALID_EMAIL: &str = "Please enter a valid email address.";

/// Sent once the address has been accepted.
pub const EMAIL_ACCEPTED: &str = "Email accepted! Now write the message you want to send:";

/// Sent after a successful delivery.
pub const DELIVERY_SUCCEEDED: &str = "Email sent successfully!";

/// Text sent after a failed delivery, embedding the failure description.
pub fn delivery_failed(error: impl Display) -> String {
    format!("Failed to send email: {error}")
}
