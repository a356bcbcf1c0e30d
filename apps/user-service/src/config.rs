use core_config::{AppInfo, Environment, FromEnv, app_info, server::ServerConfig};
use database::postgres::PostgresConfig;
use database::redis::RedisConfig;
use eyre::WrapErr;

/// Application configuration, composed from the shared config components
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: PostgresConfig,
    pub redis: RedisConfig,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        Ok(Self {
            app: app_info!(),
            environment: Environment::from_env(),
            server: ServerConfig::from_env().wrap_err("Invalid server configuration")?,
            database: PostgresConfig::from_env().wrap_err("Invalid PostgreSQL configuration")?,
            redis: RedisConfig::from_env().wrap_err("Invalid Redis configuration")?,
        })
    }
}
