//! # Axum Helpers
//!
//! Shared HTTP plumbing for the services.
//!
//! - **[`server`]**: router assembly with OpenAPI UIs, health/readiness, graceful shutdown
//! - **[`http`]**: CORS and security-header middleware
//! - **[`errors`]**: the JSON error body every endpoint returns
//! - **[`extractors`]**: `ValidatedJson`
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum_helpers::server::{create_production_app, create_router, health_router, ShutdownCoordinator};
//! use core_config::{app_info, server::ServerConfig};
//!
//! let router = create_router::<ApiDoc>(api_routes)?.merge(health_router(app_info!()));
//! let shutdown = ShutdownCoordinator::new();
//! create_production_app(router, &ServerConfig::default(), shutdown, Duration::from_secs(30), async {}).await?;
//! ```

pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use errors::ErrorResponse;
pub use extractors::ValidatedJson;
pub use http::{create_cors_layer, security_headers};
pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app, create_router,
    health_router, run_health_checks, shutdown_signal,
};
