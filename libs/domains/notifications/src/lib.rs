//! Notifications Domain
//!
//! Emails users when their account is created or deleted.
//!
//! - [`sender::NotificationSender`]: bounded-retry delivery over a [`transport::MailTransport`]
//! - [`processor::UserEventProcessor`]: consumes the `user-events` stream
//! - [`handlers`]: `POST /notifications/send`, the synchronous trigger
//!
//! ```rust,ignore
//! let transport = Arc::new(SmtpTransport::new(&SmtpConfig::from_env()?)?);
//! let sender = Arc::new(NotificationSender::new(transport, shutdown.subscribe()));
//!
//! let processor = Arc::new(UserEventProcessor::new(sender.clone()));
//! let worker = StreamWorker::new(redis, processor, WorkerConfig::from_stream_def::<UserEventsStream>());
//!
//! let router = handlers::router(sender);
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod processor;
pub mod sender;
pub mod templates;
pub mod transport;

pub use error::{NotificationError, NotificationResult};
pub use handlers::ApiDoc;
pub use models::{NotificationRequest, UserEventMessage};
pub use processor::UserEventProcessor;
pub use sender::{Failed, NotificationSender, Notifier, RetryPolicy, Sent};
pub use transport::{MailMessage, MailTransport, SmtpConfig, SmtpTransport};
