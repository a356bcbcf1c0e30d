//! Stream Worker
//!
//! Redis Streams plumbing shared by the services: a producer that appends JSON jobs,
//! a consumer-group reader, and a worker loop that hands each entry to a
//! [`StreamProcessor`].
//!
//! Delivery is at-most-once from the processor's point of view: every entry is
//! acknowledged after its processor returns, whether it succeeded, failed or panicked.
//! Processors that need retries implement them internally.
//!
//! ## Example
//!
//! ```ignore
//! use stream_worker::{StreamDef, StreamJob, StreamProcessor, StreamProducer, StreamWorker, WorkerConfig};
//!
//! struct UserEventsStream;
//! impl StreamDef for UserEventsStream {
//!     const STREAM_NAME: &'static str = "user-events";
//!     const CONSUMER_GROUP: &'static str = "notification-service";
//! }
//!
//! // Producer side
//! let producer = StreamProducer::from_stream_def::<UserEventsStream>(redis.clone());
//! producer.send(&event).await?;
//!
//! // Consumer side
//! let config = WorkerConfig::from_stream_def::<UserEventsStream>();
//! let worker = StreamWorker::new(redis, Arc::new(processor), config);
//! worker.run(shutdown_rx).await?;
//! ```

mod config;
mod consumer;
mod error;
mod event;
mod producer;
mod registry;
mod worker;

pub use config::WorkerConfig;
pub use consumer::StreamConsumer;
pub use error::StreamError;
pub use event::StreamEvent;
pub use producer::StreamProducer;
pub use registry::{MessageKey, StreamDef, StreamJob, StreamProcessor};
pub use worker::StreamWorker;
