//! Mail transport: the collaborator that actually hands a message to a mail server.
//!
//! [`SmtpTransport`] uses lettre; local development usually points it at
//! MailHog/Mailpit on port 1025 without TLS.

use crate::error::{NotificationError, NotificationResult};
use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_optional, env_or_default, env_parse};
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use tracing::debug;

/// A plain-text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// One delivery attempt. Errors are treated as transient by the sender.
    async fn send(&self, message: &MailMessage) -> NotificationResult<()>;

    /// Cheap connectivity probe for readiness.
    async fn health_check(&self) -> NotificationResult<()>;
}

/// SMTP configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// Optional for dev servers like Mailpit.
    pub username: Option<String>,
    pub password: Option<String>,
    /// False for local dev servers.
    pub use_tls: bool,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1025,
            username: None,
            password: None,
            use_tls: false,
        }
    }
}

impl FromEnv for SmtpConfig {
    /// - SMTP_HOST: defaults to localhost
    /// - SMTP_PORT: defaults to 1025
    /// - SMTP_USERNAME / SMTP_PASSWORD: optional
    /// - SMTP_USE_TLS: defaults to false
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env_or_default("SMTP_HOST", "localhost"),
            port: env_parse("SMTP_PORT", 1025)?,
            username: env_optional("SMTP_USERNAME"),
            password: env_optional("SMTP_PASSWORD"),
            use_tls: env_parse("SMTP_USE_TLS", false)?,
        })
    }
}

pub struct SmtpTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
}

impl SmtpTransport {
    pub fn new(config: &SmtpConfig) -> NotificationResult<Self> {
        let builder = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| NotificationError::Config(format!("Failed to create SMTP relay: {}", e)))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };

        let mut builder = builder.port(config.port);
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            host: config.host.clone(),
        })
    }

    fn build_message(message: &MailMessage) -> NotificationResult<Message> {
        let from: Mailbox = message
            .from
            .parse()
            .map_err(|e| NotificationError::Transport(format!("Invalid from address: {}", e)))?;
        let to: Mailbox = message
            .to
            .parse()
            .map_err(|e| NotificationError::Transport(format!("Invalid to address: {}", e)))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(&message.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())
            .map_err(|e| NotificationError::Transport(format!("Failed to build email message: {}", e)))
    }
}

#[async_trait]
impl MailTransport for SmtpTransport {
    async fn send(&self, message: &MailMessage) -> NotificationResult<()> {
        debug!(to = %message.to, subject = %message.subject, host = %self.host, "Sending email via SMTP");

        let email = Self::build_message(message)?;
        self.transport
            .send(email)
            .await
            .map_err(|e| NotificationError::Transport(format!("SMTP send failed: {}", e)))?;

        Ok(())
    }

    async fn health_check(&self) -> NotificationResult<()> {
        match self.transport.test_connection().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(NotificationError::Transport(
                "SMTP server did not accept the connection".to_string(),
            )),
            Err(e) => Err(NotificationError::Transport(format!(
                "SMTP health check failed: {}",
                e
            ))),
        }
    }
}
