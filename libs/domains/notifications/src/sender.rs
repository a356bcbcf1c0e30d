//! Bounded-retry notification delivery.
//!
//! ```text
//! START → ATTEMPT(1) ─ok→ SENT
//!             │ err
//!             ▼
//!         wait retry_delay ─shutdown→ INTERRUPTED
//!             ▼
//!         ATTEMPT(n+1) ... ATTEMPT(max) ─err→ EXHAUSTED
//! ```
//!
//! The outcome never leaves [`NotificationSender::notify`] as an error; terminal
//! failures become a single log record. Only a blank recipient is reported to the caller.

use crate::error::{NotificationError, NotificationResult};
use crate::templates;
use crate::transport::{MailMessage, MailTransport};
use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_parse};
use domain_users::UserOperation;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};

pub const MAX_RETRIES: u32 = 3;
pub const RETRY_DELAY_MS: u64 = 1000;

/// How many times to attempt a send and how long to wait between failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_RETRIES,
            retry_delay: Duration::from_millis(RETRY_DELAY_MS),
        }
    }
}

impl FromEnv for RetryPolicy {
    /// - NOTIFY_MAX_ATTEMPTS: defaults to 3, at least 1
    /// - NOTIFY_RETRY_DELAY_MS: defaults to 1000
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            max_attempts: env_parse("NOTIFY_MAX_ATTEMPTS", MAX_RETRIES)?.max(1),
            retry_delay: Duration::from_millis(env_parse("NOTIFY_RETRY_DELAY_MS", RETRY_DELAY_MS)?),
        })
    }
}

/// Delivered on attempt `attempts`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sent {
    pub attempts: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failed {
    /// Every attempt failed.
    Exhausted { attempts: u32, last_error: String },
    /// Shutdown arrived while waiting to retry.
    Interrupted { attempts: u32 },
}

/// Sends the notification for a user operation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, email: &str, operation: UserOperation) -> NotificationResult<()>;
}

pub struct NotificationSender<T: MailTransport> {
    transport: Arc<T>,
    policy: RetryPolicy,
    shutdown: watch::Receiver<bool>,
}

impl<T: MailTransport> NotificationSender<T> {
    /// `shutdown` turning `true` abandons any pending retry.
    pub fn new(transport: Arc<T>, shutdown: watch::Receiver<bool>) -> Self {
        Self {
            transport,
            policy: RetryPolicy::default(),
            shutdown,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub async fn notify_created(&self, email: &str) -> NotificationResult<()> {
        self.notify(email, UserOperation::Create).await
    }

    pub async fn notify_deleted(&self, email: &str) -> NotificationResult<()> {
        self.notify(email, UserOperation::Delete).await
    }

    /// Attempt delivery until the first success, the attempt limit, or shutdown.
    pub async fn deliver(&self, message: &MailMessage) -> Result<Sent, Failed> {
        let max = self.policy.max_attempts;
        let mut shutdown = self.shutdown.clone();
        let mut attempt = 0;

        loop {
            attempt += 1;
            let err = match self.transport.send(message).await {
                Ok(()) => {
                    info!("Email sent successfully to: {}", message.to);
                    return Ok(Sent { attempts: attempt });
                }
                Err(e) => e,
            };

            warn!(error = %err, "Failed to send email to: {}. Attempt: {}/{}", message.to, attempt, max);

            if attempt >= max {
                return Err(Failed::Exhausted {
                    attempts: attempt,
                    last_error: err.to_string(),
                });
            }

            let keep_going = tokio::select! {
                _ = tokio::time::sleep(self.policy.retry_delay) => true,
                _ = stopped(&mut shutdown) => false,
            };
            if !keep_going {
                return Err(Failed::Interrupted { attempts: attempt });
            }
        }
    }
}

#[async_trait]
impl<T: MailTransport> Notifier for NotificationSender<T> {
    async fn notify(&self, email: &str, operation: UserOperation) -> NotificationResult<()> {
        let email = email.trim();
        if email.is_empty() {
            error!(%operation, "Invalid email provided: empty");
            return Err(NotificationError::InvalidArgument(
                "Email cannot be null or empty".to_string(),
            ));
        }

        let message = templates::render(email, operation);
        match self.deliver(&message).await {
            Ok(_) => {}
            Err(Failed::Exhausted { attempts, last_error }) => error!(
                %operation,
                last_error = %last_error,
                "Failed to send email to: {} after {} attempts",
                email,
                attempts
            ),
            Err(Failed::Interrupted { attempts }) => error!(
                %operation,
                attempts,
                "Retry interrupted for email: {}",
                email
            ),
        }

        Ok(())
    }
}

/// Resolves once the shutdown flag is set; never resolves if the sender is gone.
async fn stopped(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}
