//! Turns `user-events` entries into notifications.

use crate::models::UserEventMessage;
use crate::sender::Notifier;
use async_trait::async_trait;
use domain_users::UserOperation;
use std::sync::Arc;
use stream_worker::{StreamError, StreamProcessor};
use tracing::{error, info, warn};

/// Dispatches each event to the matching notification.
///
/// Never returns an error: invalid events and failed notifications are logged and
/// the entry is acknowledged by the worker like any other.
pub struct UserEventProcessor<N: Notifier> {
    notifier: Arc<N>,
}

impl<N: Notifier> UserEventProcessor<N> {
    pub fn new(notifier: Arc<N>) -> Self {
        Self { notifier }
    }
}

#[async_trait]
impl<N: Notifier + 'static> StreamProcessor<UserEventMessage> for UserEventProcessor<N> {
    async fn process(&self, event: &UserEventMessage) -> Result<(), StreamError> {
        // A dropped event leaves exactly one record
        let (Some(operation), Some(email)) = (&event.operation, &event.email) else {
            error!(?event, "Invalid event received");
            return Ok(());
        };

        let Ok(operation) = operation.parse::<UserOperation>() else {
            warn!(%email, "Unknown operation type: {}", operation);
            return Ok(());
        };

        info!(%operation, %email, "Received user event");

        if let Err(e) = self.notifier.notify(email, operation).await {
            error!(?event, error = %e, "Error processing event");
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "UserEventProcessor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotificationError;
    use crate::sender::MockNotifier;
    use mockall::predicate::eq;
    use tracing_test::traced_test;

    fn message(operation: Option<&str>, email: Option<&str>) -> UserEventMessage {
        UserEventMessage {
            operation: operation.map(str::to_string),
            email: email.map(str::to_string),
        }
    }

    fn processor(notifier: MockNotifier) -> UserEventProcessor<MockNotifier> {
        UserEventProcessor::new(Arc::new(notifier))
    }

    fn count_lines(lines: &[&str], needle: &str) -> usize {
        lines.iter().filter(|line| line.contains(needle)).count()
    }

    #[tokio::test]
    async fn test_create_event_notifies_once() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .with(eq("a@b.co"), eq(UserOperation::Create))
            .times(1)
            .returning(|_, _| Ok(()));

        processor(notifier)
            .process(&message(Some("CREATE"), Some("a@b.co")))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_event_is_case_insensitive() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .with(eq("a@b.co"), eq(UserOperation::Delete))
            .times(1)
            .returning(|_, _| Ok(()));

        processor(notifier)
            .process(&message(Some("delete"), Some("a@b.co")))
            .await
            .unwrap();
    }

    #[tokio::test]
    #[traced_test]
    async fn test_missing_email_is_dropped() {
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().never();

        processor(notifier)
            .process(&message(Some("CREATE"), None))
            .await
            .unwrap();

        assert!(logs_contain("Invalid event received"));
        logs_assert(|lines: &[&str]| match lines.len() {
            1 => Ok(()),
            n => Err(format!("expected one log record, got {n}")),
        });
    }

    #[tokio::test]
    #[traced_test]
    async fn test_missing_operation_is_dropped() {
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().never();

        processor(notifier)
            .process(&message(None, Some("a@b.co")))
            .await
            .unwrap();

        assert!(logs_contain("Invalid event received"));
        logs_assert(|lines: &[&str]| match lines.len() {
            1 => Ok(()),
            n => Err(format!("expected one log record, got {n}")),
        });
    }

    #[tokio::test]
    #[traced_test]
    async fn test_unknown_operation_warns_once() {
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().never();

        processor(notifier)
            .process(&message(Some("FROBNICATE"), Some("a@b.co")))
            .await
            .unwrap();

        logs_assert(|lines: &[&str]| {
            match count_lines(lines, "Unknown operation type: FROBNICATE") {
                1 if lines.len() == 1 => Ok(()),
                n => Err(format!("expected one warning and nothing else, got {n} of {}", lines.len())),
            }
        });
    }

    #[tokio::test]
    #[traced_test]
    async fn test_notifier_error_is_swallowed() {
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().times(1).returning(|_, _| {
            Err(NotificationError::InvalidArgument(
                "Email cannot be null or empty".into(),
            ))
        });

        let result = processor(notifier)
            .process(&message(Some("CREATE"), Some(" ")))
            .await;

        assert!(result.is_ok());
        assert!(logs_contain("Error processing event"));
    }
}
