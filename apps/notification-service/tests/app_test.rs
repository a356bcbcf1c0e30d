//! The assembled router: API nesting and liveness.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use core_config::AppInfo;
use domain_notifications::{NotificationResult, Notifier};
use domain_users::UserOperation;
use http_body_util::BodyExt;
use std::sync::{Arc, Mutex};
use tower::ServiceExt; // For oneshot()

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<(String, UserOperation)>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, email: &str, operation: UserOperation) -> NotificationResult<()> {
        self.sent.lock().unwrap().push((email.to_string(), operation));
        Ok(())
    }
}

fn app_info() -> AppInfo {
    AppInfo {
        name: "notification-service",
        version: "0.1.0",
    }
}

#[tokio::test]
async fn test_send_is_served_under_api() {
    let notifier = Arc::new(RecordingNotifier::default());
    let app = notification_service::app(Arc::clone(&notifier), app_info()).unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/notifications/send")
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"email":"dave@example.com","operationType":"CREATE"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        notifier.sent.lock().unwrap().as_slice(),
        &[("dave@example.com".to_string(), UserOperation::Create)]
    );
}

#[tokio::test]
async fn test_health_reports_service_name() {
    let app = notification_service::app(Arc::new(RecordingNotifier::default()), app_info()).unwrap();

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["name"], "notification-service");
}
