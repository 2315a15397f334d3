use std::sync::Arc;

use mail_relay::channels::{Channel, TelegramChannel};
use mail_relay::config::RelayConfig;
use mail_relay::delivery::{Mailer, SmtpMailer};
use mail_relay::relay::Relay;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| "Failed to install rustls crypto provider")?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = RelayConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  Required: API_TOKEN, FROM_EMAIL, EMAIL_PASSWORD");
        eprintln!("  Optional: SMTP_SERVER, SMTP_PORT, TELEGRAM_ALLOWED_USERS");
        std::process::exit(1);
    });

    eprintln!("📨 Mail Relay v{}", env!("CARGO_PKG_VERSION"));
    eprintln!(
        "   SMTP: {}:{} as {}",
        config.smtp.server, config.smtp.port, config.smtp.from_address
    );
    eprintln!(
        "   Telegram: allowed {}",
        if config.allowed_users.iter().any(|u| u == "*") {
            "everyone".to_string()
        } else {
            config.allowed_users.join(", ")
        }
    );

    let channel: Arc<dyn Channel> = Arc::new(TelegramChannel::new(
        config.api_token.clone(),
        config.allowed_users.clone(),
    ));
    channel.health_check().await?;

    let mailer: Arc<dyn Mailer> = Arc::new(SmtpMailer::new(config.smtp.clone()));
    let relay = Relay::new(Arc::clone(&channel), mailer);

    tokio::select! {
        result = relay.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, shutting down");
            channel.shutdown().await?;
        }
    }

    Ok(())
}
