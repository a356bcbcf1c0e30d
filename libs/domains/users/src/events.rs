//! User lifecycle events published to the `user-events` stream.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use stream_worker::{StreamDef, StreamProducer};
use strum::{AsRefStr, Display, EnumString};
use tokio::sync::RwLock;

use crate::error::{UserError, UserResult};

/// The stream user events travel on, and the group that consumes them.
pub struct UserEventsStream;

impl StreamDef for UserEventsStream {
    const STREAM_NAME: &'static str = "user-events";
    const CONSUMER_GROUP: &'static str = "notification-service";
}

/// Which lifecycle change happened. Parsing is case-insensitive.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr, EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum UserOperation {
    Create,
    Delete,
}

/// `{"operation":"CREATE","email":"a@b.c"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEvent {
    pub operation: UserOperation,
    pub email: String,
}

impl UserEvent {
    pub fn created(email: impl Into<String>) -> Self {
        Self {
            operation: UserOperation::Create,
            email: email.into(),
        }
    }

    pub fn deleted(email: impl Into<String>) -> Self {
        Self {
            operation: UserOperation::Delete,
            email: email.into(),
        }
    }
}

/// Sends user events to the broker
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserEventPublisher: Send + Sync {
    async fn publish(&self, event: &UserEvent) -> UserResult<()>;
}

/// Publishes to the Redis stream named by [`UserEventsStream`].
#[derive(Clone)]
pub struct StreamUserEventPublisher {
    producer: StreamProducer,
}

impl StreamUserEventPublisher {
    pub fn new(redis: ConnectionManager) -> Self {
        Self {
            producer: StreamProducer::from_stream_def::<UserEventsStream>(redis),
        }
    }
}

#[async_trait]
impl UserEventPublisher for StreamUserEventPublisher {
    async fn publish(&self, event: &UserEvent) -> UserResult<()> {
        let stream_id = self
            .producer
            .send(event)
            .await
            .map_err(|e| UserError::Publish(e.to_string()))?;

        tracing::debug!(
            stream = %self.producer.stream_name(),
            stream_id = %stream_id,
            "User event appended"
        );
        Ok(())
    }
}

/// Keeps published events in memory (for development/testing).
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserEventPublisher {
    events: Arc<RwLock<Vec<UserEvent>>>,
}

impl InMemoryUserEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<UserEvent> {
        self.events.read().await.clone()
    }
}

#[async_trait]
impl UserEventPublisher for InMemoryUserEventPublisher {
    async fn publish(&self, event: &UserEvent) -> UserResult<()> {
        self.events.write().await.push(event.clone());
        Ok(())
    }
}
