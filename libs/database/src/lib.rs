//! Connection plumbing for the stores the services depend on.
//!
//! # Features
//!
//! - `postgres` (default) - PostgreSQL through SeaORM
//! - `redis` (default) - Redis `ConnectionManager` (used for the user-events stream)
//! - `config` - `core_config::FromEnv` implementations for the config structs
//!
//! ```ignore
//! use database::{postgres, redis};
//!
//! let db = postgres::connect_from_config_with_retry(pg_config, None).await?;
//! let conn = redis::connect_from_config_with_retry(redis_config, None).await?;
//! postgres::check_health(&db).await?;
//! ```

pub mod common;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "redis")]
pub mod redis;

pub use common::{DatabaseError, DatabaseResult};
