//! Worker configuration

use crate::registry::StreamDef;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub stream_name: String,

    pub consumer_group: String,

    /// Random unless set; set a stable id to resume this consumer's pending entries after a restart
    pub consumer_id: String,

    /// Entries read per XREADGROUP call; also the number processed concurrently
    pub batch_size: usize,

    /// XREADGROUP BLOCK timeout
    pub block_timeout_ms: u64,

    /// Entries idle longer than this in another consumer's pending list are claimed
    pub claim_idle_ms: u64,
}

impl WorkerConfig {
    pub fn from_stream_def<S: StreamDef>() -> Self {
        Self::new(S::STREAM_NAME, S::CONSUMER_GROUP)
    }

    pub fn new(stream_name: impl Into<String>, consumer_group: impl Into<String>) -> Self {
        Self {
            stream_name: stream_name.into(),
            consumer_group: consumer_group.into(),
            consumer_id: format!("worker-{}", Uuid::new_v4()),
            batch_size: 10,
            block_timeout_ms: 1000,
            claim_idle_ms: 60_000,
        }
    }

    pub fn with_consumer_id(mut self, id: impl Into<String>) -> Self {
        self.consumer_id = id.into();
        self
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    pub fn with_block_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.block_timeout_ms = timeout_ms;
        self
    }

    pub fn with_claim_idle_ms(mut self, idle_ms: u64) -> Self {
        self.claim_idle_ms = idle_ms;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestStream;

    impl StreamDef for TestStream {
        const STREAM_NAME: &'static str = "test-events";
        const CONSUMER_GROUP: &'static str = "test-workers";
    }

    #[test]
    fn test_from_stream_def() {
        let config = WorkerConfig::from_stream_def::<TestStream>();

        assert_eq!(config.stream_name, "test-events");
        assert_eq!(config.consumer_group, "test-workers");
        assert!(config.consumer_id.starts_with("worker-"));
        assert_eq!(config.block_timeout_ms, 1000);
    }

    #[test]
    fn test_builder_pattern() {
        let config = WorkerConfig::new("my-events", "my-group")
            .with_consumer_id("worker-1")
            .with_batch_size(0)
            .with_block_timeout_ms(250)
            .with_claim_idle_ms(5_000);

        assert_eq!(config.consumer_id, "worker-1");
        assert_eq!(config.batch_size, 1);
        assert_eq!(config.block_timeout_ms, 250);
        assert_eq!(config.claim_idle_ms, 5_000);
    }
}
