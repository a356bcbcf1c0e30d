use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Notification Service API",
        version = "0.1.0",
        description = "Sends account emails, either on demand or for events read from the user-events stream."
    ),
    servers(
        (url = "/api", description = "API base path")
    ),
    nest(
        (path = "/notifications", api = domain_notifications::ApiDoc)
    )
)]
pub struct ApiDoc;
