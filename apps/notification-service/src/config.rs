use core_config::{AppInfo, ConfigError, Environment, FromEnv, app_info, env_optional, env_parse, server::ServerConfig};
use database::redis::RedisConfig;
use domain_notifications::{RetryPolicy, SmtpConfig};
use eyre::WrapErr;

/// Stream consumer tuning
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkerSettings {
    pub block_ms: u64,
    pub batch_size: usize,
    /// Stable across restarts so the startup pending read finds this consumer's
    /// unacknowledged entries. `None` falls back to a random id.
    pub consumer_id: Option<String>,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            block_ms: 1000,
            batch_size: 10,
            consumer_id: None,
        }
    }
}

impl FromEnv for WorkerSettings {
    /// - WORKER_BLOCK_MS: how long one read blocks waiting for entries
    /// - WORKER_BATCH_SIZE: entries per read, at least 1
    /// - WORKER_CONSUMER_ID: consumer name in the group, defaults to HOSTNAME
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            block_ms: env_parse("WORKER_BLOCK_MS", defaults.block_ms)?,
            batch_size: env_parse("WORKER_BATCH_SIZE", defaults.batch_size)?.max(1),
            consumer_id: env_optional("WORKER_CONSUMER_ID").or_else(|| env_optional("HOSTNAME")),
        })
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    pub redis: RedisConfig,
    pub smtp: SmtpConfig,
    pub retry: RetryPolicy,
    pub worker: WorkerSettings,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        Ok(Self {
            app: app_info!(),
            environment: Environment::from_env(),
            server: ServerConfig::from_env().wrap_err("Invalid server configuration")?,
            redis: RedisConfig::from_env().wrap_err("Invalid Redis configuration")?,
            smtp: SmtpConfig::from_env().wrap_err("Invalid SMTP configuration")?,
            retry: RetryPolicy::from_env().wrap_err("Invalid retry configuration")?,
            worker: WorkerSettings::from_env().wrap_err("Invalid worker configuration")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_settings_defaults() {
        temp_env::with_vars_unset(
            ["WORKER_BLOCK_MS", "WORKER_BATCH_SIZE", "WORKER_CONSUMER_ID", "HOSTNAME"],
            || {
                assert_eq!(WorkerSettings::from_env().unwrap(), WorkerSettings::default());
            },
        );
    }

    #[test]
    fn test_worker_settings_from_env() {
        temp_env::with_vars(
            [("WORKER_BLOCK_MS", Some("250")), ("WORKER_BATCH_SIZE", Some("0"))],
            || {
                let settings = WorkerSettings::from_env().unwrap();
                assert_eq!(settings.block_ms, 250);
                assert_eq!(settings.batch_size, 1);
            },
        );
    }

    #[test]
    fn test_consumer_id_falls_back_to_hostname() {
        temp_env::with_vars(
            [("WORKER_CONSUMER_ID", None), ("HOSTNAME", Some("notification-7f9c"))],
            || {
                let settings = WorkerSettings::from_env().unwrap();
                assert_eq!(settings.consumer_id.as_deref(), Some("notification-7f9c"));
            },
        );
    }

    #[test]
    fn test_explicit_consumer_id_wins() {
        temp_env::with_vars(
            [("WORKER_CONSUMER_ID", Some("mailer-0")), ("HOSTNAME", Some("notification-7f9c"))],
            || {
                let settings = WorkerSettings::from_env().unwrap();
                assert_eq!(settings.consumer_id.as_deref(), Some("mailer-0"));
            },
        );
    }

    #[test]
    fn test_worker_settings_rejects_garbage() {
        temp_env::with_var("WORKER_BATCH_SIZE", Some("lots"), || {
            assert!(WorkerSettings::from_env().is_err());
        });
    }
}
