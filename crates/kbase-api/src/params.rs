//! Query parameter and multipart helpers.
//!
//! Query structs keep every parameter as an optional string so that missing
//! or malformed values produce the same JSON error body as every other
//! failure.

use std::collections::HashMap;

use axum::extract::Multipart;
use kbase_core::Error;
use uuid::Uuid;

use crate::error::ApiError;

/// A required parameter.
pub fn required<'a>(name: &str, value: Option<&'a str>) -> Result<&'a str, ApiError> {
    value.ok_or_else(|| ApiError::BadRequest(format!("{} cannot be null", name)))
}

/// A required UUID parameter.
pub fn parse_id(name: &str, value: Option<&str>) -> Result<Uuid, ApiError> {
    let raw = required(name, value)?;
    Uuid::parse_str(raw)
        .map_err(|_| ApiError::BadRequest(format!("{} '{}' is not a valid UUID", name, raw)))
}

/// A required boolean parameter.
pub fn parse_bool(name: &str, value: Option<&str>) -> Result<bool, ApiError> {
    match required(name, value)? {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(ApiError::BadRequest(format!(
            "{} must be true or false, got '{}'",
            name, other
        ))),
    }
}

/// A file part of a multipart form.
#[derive(Debug, Clone)]
pub struct FilePart {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Every field of a multipart form, read into memory.
#[derive(Debug, Default)]
pub struct FormData {
    texts: HashMap<String, String>,
    files: HashMap<String, FilePart>,
}

impl FormData {
    /// Read the whole form. Parts with a file name are kept as files, the
    /// rest as text.
    ///
    /// A part whose bytes cannot be read fails with a conversion error,
    /// like a failed conversion of the same upload would.
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = FormData::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Multipart error: {}", e)))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if field.file_name().is_some() {
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(|e| {
                    Error::ConversionFailed(format!("Reading bytes from upload not possible: {}", e))
                })?;
                form.files.insert(
                    name,
                    FilePart {
                        content_type,
                        bytes: bytes.to_vec(),
                    },
                );
            } else {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Read error: {}", e)))?;
                form.texts.insert(name, text);
            }
        }

        Ok(form)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.texts.get(name).map(String::as_str)
    }

    /// Remove and return a file part.
    pub fn take_file(&mut self, name: &str) -> Option<FilePart> {
        self.files.remove(name)
    }

    pub fn require_file(&mut self, name: &str) -> Result<FilePart, ApiError> {
        self.take_file(name)
            .ok_or_else(|| ApiError::BadRequest(format!("{} cannot be null", name)))
    }
}
