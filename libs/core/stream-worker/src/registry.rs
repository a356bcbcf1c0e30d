//! Stream definitions and the traits jobs and processors implement.

use crate::error::StreamError;
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use strum::{AsRefStr, Display};

/// Field names used in stream entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum MessageKey {
    /// The JSON-serialized payload.
    Job,
}

/// Stream definition.
///
/// Each domain declares its stream once and both the producer and the worker
/// are built from it, so the names cannot drift apart.
///
/// ```rust,ignore
/// pub struct UserEventsStream;
///
/// impl StreamDef for UserEventsStream {
///     const STREAM_NAME: &'static str = "user-events";
///     const CONSUMER_GROUP: &'static str = "notification-service";
/// }
/// ```
pub trait StreamDef: Send + Sync {
    const STREAM_NAME: &'static str;

    const CONSUMER_GROUP: &'static str;

    /// Approximate MAXLEN applied on every append.
    const MAX_LENGTH: i64 = 100_000;
}

/// Payload carried in the [`MessageKey::Job`] field.
pub trait StreamJob: Serialize + DeserializeOwned + Send + Sync + Clone + 'static {
    /// Short identifier for log lines.
    fn job_id(&self) -> String;
}

/// Handles one job at a time.
///
/// Returning `Err` is logged by the worker; the entry is acknowledged either way.
#[async_trait]
pub trait StreamProcessor<J: StreamJob>: Send + Sync {
    async fn process(&self, job: &J) -> Result<(), StreamError>;

    fn name(&self) -> &'static str;
}
