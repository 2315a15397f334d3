//! SMTP delivery via lettre over implicit TLS.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use secrecy::ExposeSecret;

use super::{DeliveryRequest, Mailer, RELAY_SUBJECT};
use crate::config::SmtpConfig;
use crate::error::DeliveryError;

/// Sends each request over a fresh authenticated SMTP session.
pub struct SmtpMailer {
    config: SmtpConfig,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    /// Build the outgoing message for `request`.
    pub fn build_message(&self, request: &DeliveryRequest) -> Result<Message, DeliveryError> {
        build_message(&self.config.from_address, request)
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, request: &DeliveryRequest) -> Result<(), DeliveryError> {
        let email = self.build_message(request)?;
        let config = self.config.clone();

        // lettre's SmtpTransport is blocking
        tokio::task::spawn_blocking(move || send_blocking(&config, &email))
            .await
            .map_err(|e| DeliveryError::Task(e.to_string()))??;

        tracing::info!(
            destination = %request.destination,
            relay = %self.config.server,
            "Email sent"
        );
        Ok(())
    }
}

fn build_message(from: &str, request: &DeliveryRequest) -> Result<Message, DeliveryError> {
    let from: Mailbox = from.parse().map_err(|e| DeliveryError::InvalidAddress {
        field: "from",
        reason: format!("{e}"),
    })?;
    let to: Mailbox = request
        .destination
        .parse()
        .map_err(|e| DeliveryError::InvalidAddress {
            field: "to",
            reason: format!("{e}"),
        })?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(RELAY_SUBJECT)
        .header(ContentType::TEXT_PLAIN)
        .body(request.body.clone())
        .map_err(|e| DeliveryError::Build(e.to_string()))
}

fn send_blocking(config: &SmtpConfig, email: &Message) -> Result<(), DeliveryError> {
    let creds = Credentials::new(
        config.from_address.clone(),
        config.password.expose_secret().to_string(),
    );

    let transport = SmtpTransport::relay(&config.server)
        .map_err(|e| DeliveryError::Transport(format!("SMTP relay error: {e}")))?
        .port(config.port)
        .credentials(creds)
        .build();

    transport
        .send(email)
        .map_err(|e| DeliveryError::Transport(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::relay::parse_email;

    fn mailer(from: &str) -> SmtpMailer {
        SmtpMailer::new(SmtpConfig {
            server: "127.0.0.1".into(),
            port: 1,
            from_address: from.into(),
            password: SecretString::from("secret"),
        })
    }

    fn formatted(message: &Message) -> String {
        String::from_utf8_lossy(&message.formatted()).into_owned()
    }

    #[test]
    fn message_carries_fixed_subject_and_addresses() {
        let request = DeliveryRequest::new("user@example.com", "Hello there");
        let message = mailer("bot@example.com").build_message(&request).unwrap();
        let raw = formatted(&message);
        assert!(raw.contains("From: bot@example.com"));
        assert!(raw.contains("To: user@example.com"));
        assert!(raw.contains(&format!("Subject: {RELAY_SUBJECT}")));
        assert!(raw.contains("text/plain"));
        assert!(raw.contains("Hello there"));
    }

    #[test]
    fn every_accepted_address_builds_a_message() {
        let mailer = mailer("bot@example.com");
        for input in ["user@example.com", "first.last+tag@mail.example.org", " user@example.com "] {
            let destination = parse_email(input).expect("should be accepted");
            let request = DeliveryRequest::new(destination, "body");
            assert!(
                mailer.build_message(&request).is_ok(),
                "{input:?} was accepted but cannot be addressed"
            );
        }
    }

    #[test]
    fn addresses_the_mailer_cannot_use_are_not_accepted() {
        for input in [
            "user@[127.0.0.1]",
            "\"a b\"@example.com",
            "user@localhost",
            "user@example",
        ] {
            assert_eq!(parse_email(input), None, "{input:?} should be rejected");
        }
    }

    #[test]
    fn invalid_destination_is_reported_as_address_error() {
        let request = DeliveryRequest::new("not-an-email", "body");
        let err = mailer("bot@example.com").build_message(&request).unwrap_err();
        assert!(matches!(err, DeliveryError::InvalidAddress { field: "to", .. }));
    }

    #[test]
    fn invalid_sender_is_reported_as_address_error() {
        let request = DeliveryRequest::new("user@example.com", "body");
        let err = mailer("bot").build_message(&request).unwrap_err();
        assert!(matches!(err, DeliveryError::InvalidAddress { field: "from", .. }));
    }

    #[tokio::test]
    async fn unreachable_relay_surfaces_transport_error() {
        let _ = rustls::crypto::ring::default_provider().install_default();
        let request = DeliveryRequest::new("user@example.com", "body");
        let err = mailer("bot@example.com").send(&request).await.unwrap_err();
        assert!(matches!(err, DeliveryError::Transport(_)), "got {err:?}");
    }
}
