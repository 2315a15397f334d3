//! Configuration types, built from environment variables.

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default outbound relay host.
pub const DEFAULT_SMTP_SERVER: &str = "smtp.yandex.ru";

/// Default outbound relay port (implicit TLS).
pub const DEFAULT_SMTP_PORT: u16 = 465;

/// Outbound mail settings.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    /// Sender address, also used as the SMTP login.
    pub from_address: String,
    pub password: SecretString,
}

/// Full relay configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Telegram bot token.
    pub api_token: SecretString,
    /// Usernames or numeric ids allowed to talk to the bot. `*` admits everyone.
    pub allowed_users: Vec<String>,
    pub smtp: SmtpConfig,
}

impl RelayConfig {
    /// Build config from the process environment.
    ///
    /// A `.env` file in the working directory is loaded first when present;
    /// variables already set in the environment win.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String, ConfigError> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
        };

        let api_token = SecretString::from(required("API_TOKEN")?);
        let from_address = required("FROM_EMAIL")?;
        let password = SecretString::from(required("EMAIL_PASSWORD")?);

        let server = lookup("SMTP_SERVER")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SMTP_SERVER.to_string());

        let port = match lookup("SMTP_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::InvalidValue {
                    key: "SMTP_PORT".into(),
                    message: format!("{raw:?}: {e}"),
                })?,
            None => DEFAULT_SMTP_PORT,
        };

        let allowed_users: Vec<String> = lookup("TELEGRAM_ALLOWED_USERS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if allowed_users.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "TELEGRAM_ALLOWED_USERS".into(),
                message: "no users listed; use * to admit everyone".into(),
            });
        }

        Ok(Self {
            api_token,
            allowed_users,
            smtp: SmtpConfig {
                server,
                port,
                from_address,
                password,
            },
        })
    }
}
