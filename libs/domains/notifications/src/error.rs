//! Error types for the notifications domain.

use thiserror::Error;

/// Result type for notification operations.
pub type NotificationResult<T> = Result<T, NotificationError>;

#[derive(Debug, Error)]
pub enum NotificationError {
    /// Rejected before any delivery attempt, e.g. a blank recipient.
    #[error("{0}")]
    InvalidArgument(String),

    /// A single send failed; the sender may retry it.
    #[error("Mail transport error: {0}")]
    Transport(String),

    /// Transport could not be built from its configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<core_config::ConfigError> for NotificationError {
    fn from(err: core_config::ConfigError) -> Self {
        NotificationError::Config(err.to_string())
    }
}
