//! Server configuration from environment variables.

use std::env;
use std::str::FromStr;

use kbase_convert::ConverterConfig;
use kbase_core::{defaults, Error, Result};

/// Which store backs the services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreKind {
    #[default]
    Postgres,
    /// Process-local maps; contents are lost on restart.
    Memory,
}

impl FromStr for StoreKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "postgres" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            _ => Err(Error::Config(format!(
                "{} must be 'postgres' or 'memory', got '{}'",
                defaults::ENV_STORE,
                s
            ))),
        }
    }
}

/// What owns a doc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocScope {
    /// Docs belong to the authenticated user (`sub` claim).
    #[default]
    User,
    /// Docs belong to a topic (`topicId` query parameter).
    Topic,
}

impl FromStr for DocScope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "topic" => Ok(Self::Topic),
            _ => Err(Error::Config(format!(
                "{} must be 'user' or 'topic', got '{}'",
                defaults::ENV_DOC_SCOPE,
                s
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub store: StoreKind,
    pub doc_scope: DocScope,
    pub cors_allowed_origin: String,
    pub max_upload_bytes: usize,
    pub converter: ConverterConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: defaults::SERVER_HOST.to_string(),
            port: defaults::SERVER_PORT,
            database_url: defaults::DATABASE_URL.to_string(),
            store: StoreKind::default(),
            doc_scope: DocScope::default(),
            cors_allowed_origin: defaults::CORS_ALLOWED_ORIGIN.to_string(),
            max_upload_bytes: defaults::MAX_UPLOAD_BYTES,
            converter: ConverterConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Load from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        let base = Self::default();
        Ok(Self {
            host: env::var(defaults::ENV_HOST).unwrap_or(base.host),
            port: parse_var(defaults::ENV_PORT, base.port)?,
            database_url: env::var(defaults::ENV_DATABASE_URL).unwrap_or(base.database_url),
            store: parse_var(defaults::ENV_STORE, base.store)?,
            doc_scope: parse_var(defaults::ENV_DOC_SCOPE, base.doc_scope)?,
            cors_allowed_origin: env::var(defaults::ENV_CORS_ALLOWED_ORIGIN)
                .unwrap_or(base.cors_allowed_origin),
            max_upload_bytes: parse_var(defaults::ENV_MAX_UPLOAD_BYTES, base.max_upload_bytes)?,
            converter: ConverterConfig::from_env().map_err(|e| Error::Config(e.to_string()))?,
        })
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}
