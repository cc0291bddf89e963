use eyre::{Result, eyre};
use serde::Deserialize;
use std::env;

/// Port on which SMTP servers expect TLS from the first byte.
pub const IMPLICIT_TLS_PORT: u16 = 465;

/// Configuration for the notification dispatcher.
///
/// SMTP delivery is optional: without `SMTP_HOST` every notification is
/// written to the log instead of being sent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotifierConfig {
    /// SMTP relay settings, `None` when `SMTP_HOST` is not set
    pub smtp: Option<SmtpSettings>,
    /// Public site URL, used for links in outgoing messages
    pub frontend_url: Option<String>,
}

/// Connection and sender details for an SMTP relay.
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpSettings {
    /// Relay host name (required)
    pub host: String,
    /// Relay port (defaults to 587)
    pub port: u16,
    /// Login user, sent together with `password`
    pub username: Option<String>,
    pub password: Option<String>,
    /// Envelope and header sender address (required)
    pub from_address: String,
    /// Display name of the sender (defaults to "SlotBook")
    pub from_name: Option<String>,
}

impl NotifierConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let frontend_url = env::var("FRONTEND_URL")
            .ok()
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        let Some(host) = env::var("SMTP_HOST").ok().filter(|h| !h.is_empty()) else {
            return Ok(Self {
                smtp: None,
                frontend_url,
            });
        };

        let port = match env::var("SMTP_PORT") {
            Ok(port) => port
                .parse::<u16>()
                .map_err(|_| eyre!("SMTP_PORT must be a valid port number"))?,
            Err(_) => 587,
        };

        let from_address = env::var("SMTP_FROM")
            .map_err(|_| eyre!("SMTP_FROM environment variable not set"))?;

        Ok(Self {
            smtp: Some(SmtpSettings {
                host,
                port,
                username: env::var("SMTP_USER").ok(),
                password: env::var("SMTP_PASSWORD").ok(),
                from_address,
                from_name: env::var("SMTP_FROM_NAME").ok(),
            }),
            frontend_url,
        })
    }

    pub fn smtp_enabled(&self) -> bool {
        self.smtp.is_some()
    }
}

impl SmtpSettings {
    /// Get the sender display name (defaults to "SlotBook" if not set)
    pub fn from_name(&self) -> &str {
        self.from_name.as_deref().unwrap_or("SlotBook")
    }

    /// Whether the relay expects implicit TLS rather than STARTTLS.
    pub fn implicit_tls(&self) -> bool {
        self.port == IMPLICIT_TLS_PORT
    }

    /// Login credentials, only when both parts are configured.
    pub fn credentials(&self) -> Option<(String, String)> {
        match (&self.username, &self.password) {
            (Some(user), Some(password)) => Some((user.clone(), password.clone())),
            _ => None,
        }
    }
}
