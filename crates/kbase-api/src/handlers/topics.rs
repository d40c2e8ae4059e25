//! Topic routes (`/topic-api/v1`).

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use kbase_core::TopicSummary;
use serde::Deserialize;

use crate::error::ApiError;
use crate::params::{parse_id, required};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TopicParams {
    id: Option<String>,
    name: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/topic",
            post(add_topic).put(rename_topic).delete(delete_topic),
        )
        .route("/topics", get(list_topics))
}

async fn add_topic(
    State(state): State<AppState>,
    Query(params): Query<TopicParams>,
) -> Result<(StatusCode, Json<TopicSummary>), ApiError> {
    let name = required("Topic name", params.name.as_deref())?;
    let topic = state.topics.add_topic(name).await?;
    Ok((StatusCode::CREATED, Json(topic)))
}

async fn list_topics(State(state): State<AppState>) -> Result<Json<Vec<TopicSummary>>, ApiError> {
    Ok(Json(state.topics.list_topics().await?))
}

async fn rename_topic(
    State(state): State<AppState>,
    Query(params): Query<TopicParams>,
) -> Result<(StatusCode, Json<TopicSummary>), ApiError> {
    let id = parse_id("Topic id", params.id.as_deref())?;
    let name = required("Topic name", params.name.as_deref())?;
    let topic = state.topics.rename_topic(id, name).await?;
    Ok((StatusCode::ACCEPTED, Json(topic)))
}

async fn delete_topic(
    State(state): State<AppState>,
    Query(params): Query<TopicParams>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id("Topic id", params.id.as_deref())?;
    state.topics.delete_topic(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
