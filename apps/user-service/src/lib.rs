//! User Service
//!
//! HTTP CRUD API for users backed by PostgreSQL. Creating or deleting a user
//! appends a `UserEvent` to the `user-events` Redis stream.
//!
//! ```text
//! HTTP /api/users ──► UserService ──► PgUserRepository ──► PostgreSQL
//!                          │
//!                          └──► StreamUserEventPublisher ──► Redis Stream (user-events)
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
use database::postgres::DatabaseConnection;
use database::redis::ConnectionManager;
use domain_users::{
    PgUserRepository, StreamUserEventPublisher, UserEventPublisher, UserRepository, UserService,
    handlers,
};
use eyre::{Result, WrapErr};
use std::time::Duration;
use tracing::{info, warn};

pub use config::Config;
pub use openapi::ApiDoc;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// API routes, documentation UIs and `/health`; readiness is added by [`run`].
pub fn app<R, P>(service: UserService<R, P>, app_info: AppInfo) -> Result<Router>
where
    R: UserRepository + 'static,
    P: UserEventPublisher + 'static,
{
    let api = Router::new().nest("/users", handlers::router(service));

    let router = create_router::<ApiDoc>(api)
        .wrap_err("Failed to build router")?
        .merge(health_router(app_info));

    Ok(router)
}

#[derive(Clone)]
struct ReadyState {
    db: DatabaseConnection,
    redis: ConnectionManager,
}

async fn ready(State(state): State<ReadyState>) -> Response {
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![
        (
            "database",
            Box::pin(async {
                database::postgres::check_health(&state.db)
                    .await
                    .map_err(|e| format!("Database ping failed: {e}"))
            }),
        ),
        (
            "redis",
            Box::pin(async {
                let mut redis = state.redis.clone();
                database::redis::check_health(&mut redis)
                    .await
                    .map_err(|e| format!("Redis ping failed: {e}"))
            }),
        ),
    ];

    run_health_checks(checks).await.into_response()
}

fn ready_router(db: DatabaseConnection, redis: ConnectionManager) -> Router {
    Router::new()
        .route("/ready", get(ready))
        .with_state(ReadyState { db, redis })
}

/// Run the user service until SIGINT/SIGTERM.
pub async fn run() -> Result<()> {
    let config = Config::from_env()?;
    core_config::tracing::init_tracing(&config.environment);

    info!(
        name = %config.app.name,
        version = %config.app.version,
        "Starting user service"
    );

    let postgres = async {
        database::postgres::connect_from_config_with_retry(config.database.clone(), None)
            .await
            .wrap_err("PostgreSQL connection failed")
    };
    let redis = async {
        database::redis::connect_from_config_with_retry(config.redis.clone(), None)
            .await
            .wrap_err("Redis connection failed")
    };
    let (db, redis) = tokio::try_join!(postgres, redis)?;

    let repository = PgUserRepository::new(db.clone());
    repository
        .ensure_schema()
        .await
        .wrap_err("Failed to prepare users table")?;

    let publisher = StreamUserEventPublisher::new(redis.clone());
    let service = UserService::new(repository, publisher);

    let router = app(service, config.app)?.merge(ready_router(db.clone(), redis));

    let cleanup = async move {
        if let Err(e) = db.close().await {
            warn!(error = %e, "Failed to close PostgreSQL pool");
        }
    };

    create_production_app(
        router,
        &config.server,
        ShutdownCoordinator::new(),
        SHUTDOWN_TIMEOUT,
        cleanup,
    )
    .await
    .wrap_err("Server error")?;

    info!("User service stopped");
    Ok(())
}
