//! Shared helpers for API tests: an in-memory server on a random port.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use kbase_api::{app, services, ApiConfig, DocScope, Stores};
use kbase_core::{defaults, ConversionBackend, Error, Result};
use reqwest::multipart::{Form, Part};
use serde_json::Value;

/// Prefixes the input with `PDF:`.
pub struct StubConverter;

#[async_trait]
impl ConversionBackend for StubConverter {
    async fn convert(&self, primary: &[u8]) -> Result<Vec<u8>> {
        let mut out = b"PDF:".to_vec();
        out.extend_from_slice(primary);
        Ok(out)
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "stub"
    }
}

/// Rejects every conversion and reports itself unreachable.
pub struct DownConverter;

#[async_trait]
impl ConversionBackend for DownConverter {
    async fn convert(&self, _primary: &[u8]) -> Result<Vec<u8>> {
        Err(Error::ConversionFailed("connection refused".to_string()))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(false)
    }

    fn name(&self) -> &str {
        "down"
    }
}

pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestServer {
    pub async fn start(scope: DocScope) -> Self {
        Self::start_with(scope, Arc::new(StubConverter)).await
    }

    pub async fn start_with(scope: DocScope, converter: Arc<dyn ConversionBackend>) -> Self {
        let config = ApiConfig {
            doc_scope: scope,
            ..ApiConfig::default()
        };
        let (state, docs) = services(Stores::memory(), converter, scope);
        let router = app(state, docs, &config).unwrap();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Create a topic and return its id.
    pub async fn create_topic(&self, name: &str) -> String {
        let resp = self
            .client
            .post(self.url("/topic-api/v1/topic"))
            .query(&[("name", name)])
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
        let body: Value = resp.json().await.unwrap();
        body["id"].as_str().unwrap().to_string()
    }
}

/// Unsigned bearer token whose payload carries `sub`.
pub fn bearer(sub: &str) -> String {
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"{}"}}"#, sub));
    format!("Bearer eyJhbGciOiJSUzI1NiJ9.{}.c2lnbmF0dXJl", payload)
}

pub fn docx_part(bytes: &[u8]) -> Part {
    Part::bytes(bytes.to_vec())
        .file_name("lecture.docx")
        .mime_str(defaults::DOCX_MIME)
        .unwrap()
}

pub fn png_part(bytes: &[u8]) -> Part {
    Part::bytes(bytes.to_vec())
        .file_name("answer.png")
        .mime_str(defaults::PNG_MIME)
        .unwrap()
}

pub fn doc_form(name: &str, bytes: &[u8]) -> Form {
    Form::new()
        .text("name", name.to_string())
        .part("docxFile", docx_part(bytes))
}

/// The `error` field of a JSON error body.
pub async fn error_message(resp: reqwest::Response) -> String {
    let body: Value = resp.json().await.unwrap();
    body["error"].as_str().unwrap().to_string()
}
