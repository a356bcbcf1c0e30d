//! Notification Service
//!
//! Consumes `UserEvent`s from the `user-events` stream (consumer group
//! `notification-service`) and emails the affected user. The same delivery path
//! is exposed over HTTP at `POST /api/notifications/send`.
//!
//! ```text
//! Redis Stream (user-events) ──► StreamWorker ──► UserEventProcessor ─┐
//!                                                                      ├─► NotificationSender ──► SMTP
//! HTTP /api/notifications/send ───────────────────────────────────────┘
//! ```

mod config;
mod openapi;

use axum::{
    Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
};
use axum_helpers::server::{
    HealthCheckFuture, ShutdownCoordinator, create_production_app, create_router, health_router,
    run_health_checks,
};
use core_config::AppInfo;
use database::redis::ConnectionManager;
use domain_notifications::{
    MailTransport, NotificationSender, Notifier, SmtpTransport, UserEventProcessor, handlers,
};
use domain_users::UserEventsStream;
use eyre::{Result, WrapErr};
use std::sync::Arc;
use std::time::Duration;
use stream_worker::{StreamWorker, WorkerConfig};
use tracing::{error, info};

pub use config::{Config, WorkerSettings};
pub use openapi::ApiDoc;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// API routes, documentation UIs and `/health`; readiness is added by [`run`].
pub fn app<N: Notifier + 'static>(notifier: Arc<N>, app_info: AppInfo) -> Result<Router> {
    let api = Router::new().nest("/notifications", handlers::router(notifier));

    let router = create_router::<ApiDoc>(api)
        .wrap_err("Failed to build router")?
        .merge(health_router(app_info));

    Ok(router)
}

#[derive(Clone)]
struct ReadyState {
    redis: ConnectionManager,
    transport: Arc<SmtpTransport>,
}

async fn ready(State(state): State<ReadyState>) -> Response {
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![
        (
            "redis",
            Box::pin(async {
                let mut redis = state.redis.clone();
                database::redis::check_health(&mut redis)
                    .await
                    .map_err(|e| format!("Redis ping failed: {e}"))
            }),
        ),
        (
            "smtp",
            Box::pin(async {
                state
                    .transport
                    .health_check()
                    .await
                    .map_err(|e| format!("SMTP check failed: {e}"))
            }),
        ),
    ];

    run_health_checks(checks).await.into_response()
}

fn ready_router(redis: ConnectionManager, transport: Arc<SmtpTransport>) -> Router {
    Router::new()
        .route("/ready", get(ready))
        .with_state(ReadyState { redis, transport })
}

fn worker_config(settings: &WorkerSettings) -> WorkerConfig {
    let config = WorkerConfig::from_stream_def::<UserEventsStream>()
        .with_block_timeout_ms(settings.block_ms)
        .with_batch_size(settings.batch_size);

    match &settings.consumer_id {
        Some(id) => config.with_consumer_id(id.as_str()),
        None => config,
    }
}

/// Run the notification service until SIGINT/SIGTERM.
pub async fn run() -> Result<()> {
    let config = Config::from_env()?;
    core_config::tracing::init_tracing(&config.environment);

    info!(
        name = %config.app.name,
        version = %config.app.version,
        smtp_host = %config.smtp.host,
        smtp_port = config.smtp.port,
        max_attempts = config.retry.max_attempts,
        "Starting notification service"
    );

    let redis = database::redis::connect_from_config_with_retry(config.redis.clone(), None)
        .await
        .wrap_err("Redis connection failed")?;

    let transport =
        Arc::new(SmtpTransport::new(&config.smtp).wrap_err("Failed to build SMTP transport")?);

    let shutdown = ShutdownCoordinator::new();
    let sender = Arc::new(
        NotificationSender::new(Arc::clone(&transport), shutdown.subscribe())
            .with_policy(config.retry),
    );

    let processor = Arc::new(UserEventProcessor::new(Arc::clone(&sender)));
    let worker = StreamWorker::new(redis.clone(), processor, worker_config(&config.worker));
    let worker_shutdown = shutdown.subscribe();
    let worker_handle = tokio::spawn(async move {
        if let Err(e) = worker.run(worker_shutdown).await {
            error!(error = %e, "User event consumer failed to start");
        }
    });

    let router = app(Arc::clone(&sender), config.app)?.merge(ready_router(redis, transport));

    let cleanup = async move {
        info!("Waiting for user event consumer to finish");
        if let Err(e) = worker_handle.await {
            error!(error = %e, "User event consumer task panicked");
        }
    };

    create_production_app(router, &config.server, shutdown, SHUTDOWN_TIMEOUT, cleanup)
        .await
        .wrap_err("Server error")?;

    info!("Notification service stopped");
    Ok(())
}
