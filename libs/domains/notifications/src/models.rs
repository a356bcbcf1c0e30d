use serde::{Deserialize, Serialize};
use stream_worker::StreamJob;
use utoipa::ToSchema;

/// A user event as read from the stream.
///
/// Both fields are optional so an incomplete envelope still decodes and can be
/// logged and dropped by the processor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEventMessage {
    #[serde(default)]
    pub operation: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl StreamJob for UserEventMessage {
    fn job_id(&self) -> String {
        format!(
            "{}:{}",
            self.operation.as_deref().unwrap_or("?"),
            self.email.as_deref().unwrap_or("?")
        )
    }
}

/// Body of `POST /notifications/send`
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct NotificationRequest {
    pub email: Option<String>,
    /// `CREATE` or `DELETE`, any case
    #[serde(rename = "operationType")]
    pub operation_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_decodes_without_fields() {
        let message: UserEventMessage = serde_json::from_str("{}").unwrap();
        assert_eq!(message, UserEventMessage::default());
    }

    #[test]
    fn test_message_decodes_producer_format() {
        let message: UserEventMessage =
            serde_json::from_str(r#"{"operation":"CREATE","email":"a@b.co"}"#).unwrap();
        assert_eq!(message.operation.as_deref(), Some("CREATE"));
        assert_eq!(message.job_id(), "CREATE:a@b.co");
    }

    #[test]
    fn test_request_uses_camel_case_operation_type() {
        let request: NotificationRequest =
            serde_json::from_str(r#"{"email":"a@b.co","operationType":"delete"}"#).unwrap();
        assert_eq!(request.operation_type.as_deref(), Some("delete"));
    }
}
