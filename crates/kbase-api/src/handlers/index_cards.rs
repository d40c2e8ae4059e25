//! Index card routes (`/index-card-api/v1`).

use axum::extract::{Multipart, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use kbase_content::validation::validate_png_content_type;
use kbase_core::{defaults, IndexCardSummary, TopicId};
use serde::Deserialize;

use crate::error::ApiError;
use crate::params::{parse_bool, parse_id, required, FilePart, FormData};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexCardParams {
    id: Option<String>,
    topic_id: Option<String>,
    question: Option<String>,
    answer: Option<String>,
    is_marked: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/index-card",
            post(add_index_card)
                .get(get_answer_image)
                .delete(delete_index_card),
        )
        .route("/index-cards", get(list_index_cards))
        .route("/index-card/question", put(set_question))
        .route("/index-card/answer", put(set_answer))
        .route("/index-card/answer-image", put(set_answer_image))
        .route("/index-card/remove/answer-image", put(remove_answer_image))
        .route("/index-card/marked", put(set_marked))
        .route("/index-cards/by-topicId", delete(delete_all_by_topic))
}

/// An uploaded answer image, `None` for an empty part.
fn answer_image(part: Option<FilePart>) -> Result<Option<Vec<u8>>, ApiError> {
    match part {
        Some(part) if !part.bytes.is_empty() => {
            validate_png_content_type(part.content_type.as_deref())?;
            Ok(Some(part.bytes))
        }
        _ => Ok(None),
    }
}

async fn add_index_card(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<IndexCardSummary>), ApiError> {
    let mut form = FormData::read(multipart).await?;
    let topic_id = parse_id("Topic id", form.text("topicId"))?;
    let question = required("Question", form.text("question"))?.to_string();
    let answer = required("Answer", form.text("answer"))?.to_string();
    let image = answer_image(form.take_file("answerImage"))?;

    let card = state
        .index_cards
        .add_index_card(TopicId(topic_id), &question, &answer, image)
        .await?;
    Ok((StatusCode::CREATED, Json(card)))
}

async fn list_index_cards(
    State(state): State<AppState>,
    Query(params): Query<IndexCardParams>,
) -> Result<Json<Vec<IndexCardSummary>>, ApiError> {
    let topic_id = parse_id("Topic id", params.topic_id.as_deref())?;
    Ok(Json(
        state.index_cards.list_by_topic(TopicId(topic_id)).await?,
    ))
}

async fn get_answer_image(
    State(state): State<AppState>,
    Query(params): Query<IndexCardParams>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id("Index card id", params.id.as_deref())?;
    let image = state.index_cards.get_answer_image(id).await?;
    Ok(([(header::CONTENT_TYPE, defaults::PNG_MIME)], image))
}

async fn set_question(
    State(state): State<AppState>,
    Query(params): Query<IndexCardParams>,
) -> Result<(StatusCode, Json<IndexCardSummary>), ApiError> {
    let id = parse_id("Index card id", params.id.as_deref())?;
    let question = required("Question", params.question.as_deref())?;
    let card = state.index_cards.set_question(id, question).await?;
    Ok((StatusCode::ACCEPTED, Json(card)))
}

async fn set_answer(
    State(state): State<AppState>,
    Query(params): Query<IndexCardParams>,
) -> Result<(StatusCode, Json<IndexCardSummary>), ApiError> {
    let id = parse_id("Index card id", params.id.as_deref())?;
    let answer = required("Answer", params.answer.as_deref())?;
    let card = state.index_cards.set_answer(id, answer).await?;
    Ok((StatusCode::ACCEPTED, Json(card)))
}

async fn set_answer_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<IndexCardSummary>), ApiError> {
    let mut form = FormData::read(multipart).await?;
    let id = parse_id("Index card id", form.text("id"))?;
    let image = answer_image(Some(form.require_file("answerImage")?))?
        .ok_or_else(|| ApiError::BadRequest("answerImage cannot be empty".to_string()))?;

    let card = state.index_cards.set_answer_image(id, image).await?;
    Ok((StatusCode::ACCEPTED, Json(card)))
}

async fn remove_answer_image(
    State(state): State<AppState>,
    Query(params): Query<IndexCardParams>,
) -> Result<(StatusCode, Json<IndexCardSummary>), ApiError> {
    let id = parse_id("Index card id", params.id.as_deref())?;
    let card = state.index_cards.remove_answer_image(id).await?;
    Ok((StatusCode::ACCEPTED, Json(card)))
}

async fn set_marked(
    State(state): State<AppState>,
    Query(params): Query<IndexCardParams>,
) -> Result<(StatusCode, Json<IndexCardSummary>), ApiError> {
    let id = parse_id("Index card id", params.id.as_deref())?;
    let is_marked = parse_bool("isMarked", params.is_marked.as_deref())?;
    let card = state.index_cards.set_marked(id, is_marked).await?;
    Ok((StatusCode::ACCEPTED, Json(card)))
}

async fn delete_index_card(
    State(state): State<AppState>,
    Query(params): Query<IndexCardParams>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id("Index card id", params.id.as_deref())?;
    state.index_cards.delete_index_card(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_all_by_topic(
    State(state): State<AppState>,
    Query(params): Query<IndexCardParams>,
) -> Result<StatusCode, ApiError> {
    let topic_id = parse_id("Topic id", params.topic_id.as_deref())?;
    state
        .index_cards
        .delete_all_by_topic(TopicId(topic_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
