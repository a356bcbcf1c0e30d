use super::shutdown::ShutdownCoordinator;
use crate::errors::not_found;
use crate::http::{create_cors_layer, security_headers};
use axum::{Router, middleware};
use core_config::{env_optional, server::ServerConfig};
use std::future::Future;
use std::io;
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info, warn};
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;
use utoipa_redoc::{Redoc, Servable as RedocServable};
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

/// Wraps the service's API routes with documentation UIs and common middleware.
///
/// - `apis` is nested under `/api`
/// - Swagger UI at `/swagger-ui`, plus `/redoc`, `/rapidoc` and `/scalar`
/// - unknown paths fall back to a 404 [`ErrorResponse`](crate::ErrorResponse)
/// - request tracing, security headers, CORS (`CORS_ALLOWED_ORIGIN`) and compression
///
/// Health endpoints are merged by the caller with [`health_router`](super::health_router).
///
/// # Errors
/// Fails when `CORS_ALLOWED_ORIGIN` is set but holds no valid origin.
pub fn create_router<T>(apis: Router) -> io::Result<Router>
where
    T: OpenApi + 'static,
{
    let origins = env_optional("CORS_ALLOWED_ORIGIN");
    let cors_layer = create_cors_layer(origins.as_deref())?;
    if let Some(origins) = &origins {
        info!(%origins, "CORS configured");
    }

    let router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", T::openapi()))
        .merge(Redoc::with_url("/redoc", T::openapi()))
        .merge(RapiDoc::new("/api-docs/openapi.json").path("/rapidoc"))
        .merge(Scalar::with_url("/scalar", T::openapi()))
        .nest("/api", apis)
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(middleware::from_fn(security_headers))
        .layer(cors_layer)
        .layer(CompressionLayer::new());

    Ok(router)
}

/// Serves `router` until `shutdown` fires, then runs `cleanup` bounded by `shutdown_timeout`.
///
/// SIGINT/SIGTERM trigger `shutdown`; anything else holding the coordinator (a stream
/// worker, a sender waiting out a retry delay) observes the same signal.
pub async fn create_production_app<F>(
    router: Router,
    server_config: &ServerConfig,
    shutdown: ShutdownCoordinator,
    shutdown_timeout: Duration,
    cleanup: F,
) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;
    info!("Server starting on {}", listener.local_addr()?);

    let signal_handle = shutdown.clone();
    tokio::spawn(async move { signal_handle.listen_for_signal().await });

    let server_shutdown = shutdown.clone();
    let serve_result = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move { server_shutdown.wait().await })
        .await
        .inspect_err(|e| tracing::error!("Server encountered an error: {:?}", e));

    // A serve error also has to release the other listeners
    shutdown.shutdown();

    info!("Starting cleanup tasks (timeout: {:?})", shutdown_timeout);
    match tokio::time::timeout(shutdown_timeout, cleanup).await {
        Ok(()) => info!("Cleanup completed successfully"),
        Err(_) => warn!(
            "Cleanup exceeded timeout of {:?}, forcing shutdown",
            shutdown_timeout
        ),
    }

    serve_result
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::get,
    };
    use tower::ServiceExt;

    #[derive(OpenApi)]
    #[openapi(info(title = "test"))]
    struct EmptyDoc;

    fn api() -> Router {
        Router::new().route("/ping", get(|| async { "pong" }))
    }

    #[tokio::test]
    async fn test_api_routes_are_nested() {
        let router = temp_env::with_var_unset("CORS_ALLOWED_ORIGIN", || {
            create_router::<EmptyDoc>(api())
        })
        .unwrap();

        let response = router
            .oneshot(Request::builder().uri("/api/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let router = temp_env::with_var_unset("CORS_ALLOWED_ORIGIN", || {
            create_router::<EmptyDoc>(api())
        })
        .unwrap();

        let response = router
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_invalid_cors_origin_fails() {
        let result = temp_env::with_var("CORS_ALLOWED_ORIGIN", Some(","), || {
            create_router::<EmptyDoc>(api())
        });
        assert!(result.is_err());
    }
}
