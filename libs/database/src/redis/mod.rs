//! Redis connection setup and health check

mod config;
mod connector;
mod health;

pub use config::RedisConfig;
pub use connector::{connect, connect_from_config_with_retry};
pub use health::check_health;

pub use redis::aio::ConnectionManager;
