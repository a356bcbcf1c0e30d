//! Stream error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StreamError {
    /// Redis connection or command error
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Returned by a processor that could not handle a job
    #[error("Processing error: {0}")]
    Processing(String),
}

impl StreamError {
    pub fn processing(message: impl Into<String>) -> Self {
        StreamError::Processing(message.into())
    }

    /// `NOGROUP`: the consumer group (or the stream) was deleted under us.
    pub fn is_nogroup_error(&self) -> bool {
        matches!(self, StreamError::Redis(e) if e.code() == Some("NOGROUP"))
    }

    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            StreamError::Redis(e) if e.is_io_error() || e.is_connection_dropped() || e.is_connection_refusal()
        )
    }
}

impl From<serde_json::Error> for StreamError {
    fn from(err: serde_json::Error) -> Self {
        StreamError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_errors_become_serialization() {
        let err: StreamError = serde_json::from_str::<u32>("not json").unwrap_err().into();
        assert!(matches!(err, StreamError::Serialization(_)));
    }

    #[test]
    fn test_processing_error_is_not_a_redis_condition() {
        let err = StreamError::processing("mailbox unavailable");
        assert_eq!(err.to_string(), "Processing error: mailbox unavailable");
        assert!(!err.is_nogroup_error());
        assert!(!err.is_connection_error());
    }
}
