//! Liveness probe.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ConverterHealth {
    pub backend: String,
    pub reachable: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub converter: ConverterHealth,
}

/// Always 200 while the process serves requests; an unreachable converter
/// degrades the status instead of failing the probe.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let reachable = state.converter.health_check().await.unwrap_or(false);
    Json(HealthResponse {
        status: if reachable { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        converter: ConverterHealth {
            backend: state.converter.name().to_string(),
            reachable,
        },
    })
}
