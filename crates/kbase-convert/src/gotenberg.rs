//! Gotenberg office-to-PDF conversion backend.

use std::time::Instant;

use async_trait::async_trait;
use kbase_core::{defaults, ConversionBackend, Error, Result};
use reqwest::multipart::{Form, Part};
use tracing::{debug, warn};

use crate::config::{ConfigResult, ConverterConfig};

/// Converts DOCX to PDF through a Gotenberg LibreOffice route.
///
/// One POST per conversion, no retries. Transport errors, non-2xx responses
/// and empty bodies all surface as [`Error::ConversionFailed`].
pub struct GotenbergBackend {
    config: ConverterConfig,
    client: reqwest::Client,
}

impl GotenbergBackend {
    pub fn new(config: ConverterConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Create from environment variables.
    pub fn from_env() -> ConfigResult<Self> {
        Ok(Self::new(ConverterConfig::from_env()?))
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }
}

fn upload_part(primary: &[u8], mime: &str) -> Result<Part> {
    Part::bytes(primary.to_vec())
        .file_name(defaults::CONVERTER_FILE_NAME)
        .mime_str(mime)
        .map_err(|e| Error::ConversionFailed(format!("failed to build upload part: {}", e)))
}

#[async_trait]
impl ConversionBackend for GotenbergBackend {
    async fn convert(&self, primary: &[u8]) -> Result<Vec<u8>> {
        let start = Instant::now();
        let url = self.config.convert_url();

        let form = Form::new().part(
            defaults::CONVERTER_FILE_FIELD,
            upload_part(primary, defaults::DOCX_MIME)?,
        );

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| {
                warn!(
                    subsystem = "convert",
                    component = "gotenberg",
                    op = "convert",
                    error = %e,
                    "Conversion request failed"
                );
                Error::ConversionFailed(format!("request to converter failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                subsystem = "convert",
                component = "gotenberg",
                op = "convert",
                status = status.as_u16(),
                "Converter returned an error status"
            );
            return Err(Error::ConversionFailed(format!(
                "converter returned {}: {}",
                status, body
            )));
        }

        let derived = response
            .bytes()
            .await
            .map_err(|e| Error::ConversionFailed(format!("failed to read converter response: {}", e)))?;

        if derived.is_empty() {
            return Err(Error::ConversionFailed(
                "converter returned an empty document".to_string(),
            ));
        }

        debug!(
            subsystem = "convert",
            component = "gotenberg",
            op = "convert",
            byte_len = primary.len(),
            result_len = derived.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Converted document"
        );
        Ok(derived.to_vec())
    }

    async fn health_check(&self) -> Result<bool> {
        let timeout = std::time::Duration::from_secs(defaults::CONVERTER_HEALTH_TIMEOUT_SECS);
        match self
            .client
            .get(self.config.health_url())
            .timeout(timeout)
            .send()
            .await
        {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    fn name(&self) -> &str {
        "gotenberg"
    }
}
