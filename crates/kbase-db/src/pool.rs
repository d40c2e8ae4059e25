//! PostgreSQL pool setup.

use std::env;
use std::time::{Duration, Instant};

use kbase_core::{defaults, Error, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, warn};

/// Sizing and timeouts of the connection pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    /// How long a caller waits for a free connection.
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    /// `None` keeps connections until they fail.
    pub max_lifetime: Option<Duration>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: defaults::DB_MAX_CONNECTIONS,
            min_connections: defaults::DB_MIN_CONNECTIONS,
            acquire_timeout: Duration::from_secs(defaults::DB_ACQUIRE_TIMEOUT_SECS),
            idle_timeout: Duration::from_secs(defaults::DB_IDLE_TIMEOUT_SECS),
            max_lifetime: Some(Duration::from_secs(defaults::DB_MAX_LIFETIME_SECS)),
        }
    }
}

impl PoolConfig {
    /// Defaults overridden by `DB_MAX_CONNECTIONS` and `DB_ACQUIRE_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(value) = env::var(defaults::ENV_DB_MAX_CONNECTIONS) {
            config.max_connections = value.parse().map_err(|_| {
                Error::Config(format!(
                    "{} must be a positive integer, got '{}'",
                    defaults::ENV_DB_MAX_CONNECTIONS,
                    value
                ))
            })?;
        }
        if let Ok(value) = env::var(defaults::ENV_DB_ACQUIRE_TIMEOUT_SECS) {
            let secs: u64 = value.parse().map_err(|_| {
                Error::Config(format!(
                    "{} must be a number of seconds, got '{}'",
                    defaults::ENV_DB_ACQUIRE_TIMEOUT_SECS,
                    value
                ))
            })?;
            config.acquire_timeout = Duration::from_secs(secs);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn with_max_connections(mut self, n: u32) -> Self {
        self.max_connections = n;
        self
    }

    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_connections == 0 {
            return Err(Error::Config(
                "Pool needs at least one connection".to_string(),
            ));
        }
        if self.min_connections > self.max_connections {
            return Err(Error::Config(format!(
                "Pool minimum ({}) exceeds maximum ({})",
                self.min_connections, self.max_connections
            )));
        }
        Ok(())
    }

    pub(crate) fn options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.acquire_timeout)
            .idle_timeout(self.idle_timeout)
            .max_lifetime(self.max_lifetime)
    }
}

/// Open a pool against `database_url`.
pub async fn connect_pool(database_url: &str, config: &PoolConfig) -> Result<PgPool> {
    config.validate()?;
    let start = Instant::now();
    let target = redact_password(database_url);

    let pool = config
        .options()
        .connect(database_url)
        .await
        .map_err(|e| {
            warn!(
                subsystem = "db",
                component = "pool",
                op = "connect",
                url = %target,
                error = %e,
                "Database connection failed"
            );
            Error::Database(e)
        })?;

    info!(
        subsystem = "db",
        component = "pool",
        op = "connect",
        url = %target,
        max_connections = config.max_connections,
        duration_ms = start.elapsed().as_millis() as u64,
        "Database pool ready"
    );
    Ok(pool)
}

/// Replace the password of a connection URL for logging.
fn redact_password(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    match rest.split_once('@') {
        Some((credentials, host)) => match credentials.split_once(':') {
            Some((user, _)) => format!("{}://{}:***@{}", scheme, user, host),
            None => url.to_string(),
        },
        None => url.to_string(),
    }
}
