//! Appends jobs to a stream.
//!
//! ```rust,ignore
//! let producer = StreamProducer::from_stream_def::<UserEventsStream>(redis);
//! let entry_id = producer.send(&event).await?;
//! ```

use crate::error::StreamError;
use crate::registry::{MessageKey, StreamDef};
use redis::aio::ConnectionManager;
use serde::Serialize;
use tracing::debug;

#[derive(Clone)]
pub struct StreamProducer {
    redis: ConnectionManager,
    stream_name: String,
    max_length: i64,
}

impl StreamProducer {
    pub fn new(redis: ConnectionManager, stream_name: impl Into<String>) -> Self {
        Self {
            redis,
            stream_name: stream_name.into(),
            max_length: 100_000,
        }
    }

    /// Producer for the stream a `StreamDef` names, with its MAXLEN.
    pub fn from_stream_def<S: StreamDef>(redis: ConnectionManager) -> Self {
        Self::new(redis, S::STREAM_NAME).with_max_length(S::MAX_LENGTH)
    }

    pub fn with_max_length(mut self, max_length: i64) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn stream_name(&self) -> &str {
        &self.stream_name
    }

    /// Append `job` as JSON and return the entry ID.
    pub async fn send<J: Serialize>(&self, job: &J) -> Result<String, StreamError> {
        let mut conn = self.redis.clone();
        let payload = serde_json::to_string(job)?;

        // MAXLEN ~ trims lazily, which is much cheaper than an exact cap
        let stream_id: String = redis::cmd("XADD")
            .arg(&self.stream_name)
            .arg("MAXLEN")
            .arg("~")
            .arg(self.max_length)
            .arg("*")
            .arg(MessageKey::Job.as_ref())
            .arg(&payload)
            .query_async(&mut conn)
            .await?;

        debug!(stream = %self.stream_name, stream_id = %stream_id, "Appended entry");

        Ok(stream_id)
    }
}
