use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use domain_users::UserOperation;
use std::sync::Arc;
use tracing::{error, info};
use utoipa::OpenApi;

use crate::error::NotificationError;
use crate::models::NotificationRequest;
use crate::sender::Notifier;

pub const TAG: &str = "notifications";

const MISSING_FIELDS: &str = "Email and operationType are required";
const INVALID_OPERATION: &str = "Invalid operationType. Supported values: CREATE, DELETE";
const SEND_FAILED: &str = "Failed to send notification";
const SENT: &str = "Notification sent successfully";

/// OpenAPI documentation for the Notifications API
#[derive(OpenApi)]
#[openapi(
    paths(send_notification),
    components(schemas(NotificationRequest)),
    tags(
        (name = TAG, description = "Synchronous notification trigger")
    )
)]
pub struct ApiDoc;

/// Create the notifications router
pub fn router<N: Notifier + 'static>(notifier: Arc<N>) -> Router {
    Router::new()
        .route("/send", post(send_notification::<N>))
        .with_state(notifier)
}

/// Send a notification for a user operation.
///
/// Responds once the attempt sequence has finished; 200 does not prove delivery.
#[utoipa::path(
    post,
    path = "/send",
    tag = TAG,
    request_body = NotificationRequest,
    responses(
        (status = 200, description = "Attempt sequence completed", body = String, content_type = "text/plain"),
        (status = 400, description = "Missing fields, unknown operationType or blank email", body = String, content_type = "text/plain"),
        (status = 500, description = "Unexpected failure", body = String, content_type = "text/plain")
    )
)]
async fn send_notification<N: Notifier>(
    State(notifier): State<Arc<N>>,
    request: Result<Json<NotificationRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(request)) = request else {
        error!("Invalid request: body is missing or malformed");
        return (StatusCode::BAD_REQUEST, MISSING_FIELDS).into_response();
    };

    info!(
        email = ?request.email,
        operation_type = ?request.operation_type,
        "Received notification request"
    );

    let (Some(email), Some(operation_type)) = (request.email, request.operation_type) else {
        error!("Invalid request: email and operationType are required");
        return (StatusCode::BAD_REQUEST, MISSING_FIELDS).into_response();
    };

    let Ok(operation) = operation_type.parse::<UserOperation>() else {
        error!(%operation_type, "Invalid operationType");
        return (StatusCode::BAD_REQUEST, INVALID_OPERATION).into_response();
    };

    match notifier.notify(&email, operation).await {
        Ok(()) => (StatusCode::OK, SENT).into_response(),
        Err(NotificationError::InvalidArgument(message)) => {
            error!(%message, "Validation error");
            (StatusCode::BAD_REQUEST, message).into_response()
        }
        Err(e) => {
            error!(error = %e, "Error sending notification");
            (StatusCode::INTERNAL_SERVER_ERROR, SEND_FAILED).into_response()
        }
    }
}
