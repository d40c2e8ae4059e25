//! Converter configuration.
//!
//! Loaded from environment variables:
//! - `CONVERTER_URL`: full base URL, wins over host and port
//! - `GOTENBERG_HOST` / `GOTENBERG_PORT`: default `localhost:3000`
//! - `CONVERTER_TIMEOUT_SECS`: per-request timeout, default 60

use std::env;
use std::time::Duration;

use kbase_core::defaults;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Where and how to reach the conversion service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterConfig {
    /// Base URL without trailing slash, e.g. `http://localhost:3000`.
    pub base_url: String,
    /// Route appended to `base_url` for conversions.
    pub route: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self::from_host_port(defaults::CONVERTER_HOST, defaults::CONVERTER_PORT)
    }
}

impl ConverterConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            route: defaults::CONVERTER_ROUTE.to_string(),
            timeout: Duration::from_secs(defaults::CONVERTER_TIMEOUT_SECS),
        }
    }

    pub fn from_host_port(host: &str, port: u16) -> Self {
        Self::new(format!("http://{}:{}", host, port))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load from environment variables, falling back to defaults.
    pub fn from_env() -> ConfigResult<Self> {
        let mut config = match env::var(defaults::ENV_CONVERTER_URL) {
            Ok(url) if !url.is_empty() => Self::new(url),
            _ => {
                let host = env::var(defaults::ENV_GOTENBERG_HOST)
                    .unwrap_or_else(|_| defaults::CONVERTER_HOST.to_string());
                let port = parse_var(defaults::ENV_GOTENBERG_PORT, defaults::CONVERTER_PORT)?;
                Self::from_host_port(&host, port)
            }
        };

        let timeout_secs = parse_var(
            defaults::ENV_CONVERTER_TIMEOUT_SECS,
            defaults::CONVERTER_TIMEOUT_SECS,
        )?;
        config.timeout = Duration::from_secs(timeout_secs);

        config.validate()?;
        Ok(config)
    }

    /// Full URL of the conversion route.
    pub fn convert_url(&self) -> String {
        format!("{}{}", self.base_url, self.route)
    }

    /// Full URL of the health route.
    pub fn health_url(&self) -> String {
        format!("{}/health", self.base_url)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "converter URL must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        if !self.route.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "converter route must start with '/', got '{}'",
                self.route
            )));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::Validation(
                "converter timeout must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> ConfigResult<T> {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_points_at_local_gotenberg() {
        let config = ConverterConfig::default();
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(
            config.convert_url(),
            "http://localhost:3000/forms/libreoffice/convert"
        );
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let config = ConverterConfig::new("http://gotenberg:3000/");
        assert_eq!(config.health_url(), "http://gotenberg:3000/health");
    }

    #[test]
    fn test_validate_rejects_bad_scheme() {
        let config = ConverterConfig::new("gotenberg:3000");
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = ConverterConfig::default().with_timeout(Duration::ZERO);
        assert!(config.validate().is_err());
    }
}
