//! Doc routes (`/api/v1/docs`).
//!
//! The router is generic over the owner key; every route resolves the owner
//! from the request before touching the store, so a doc is only visible
//! under the owner it was uploaded for.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{delete, get, patch};
use axum::{Json, Router};
use kbase_content::validation::validate_docx_content_type;
use kbase_content::DocService;
use kbase_core::{defaults, DocSummary, TopicId};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::owner::{Owner, RequestOwner};
use crate::params::{parse_id, required, FormData};

#[derive(Debug, Deserialize)]
pub struct RenameParams {
    name: Option<String>,
}

/// Routes shared by every owner model.
pub fn router<O: RequestOwner, S>(service: DocService<O>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(list_docs::<O>).post(add_doc::<O>))
        .route("/:id", delete(delete_doc::<O>))
        .route("/:id/pdf", get(get_pdf::<O>))
        .route("/:id/docx", get(get_docx::<O>))
        .route("/:id/rename", patch(rename_doc::<O>))
        .route("/:id/replace-file", patch(replace_file::<O>))
        .with_state(service)
}

/// Routes of topic-owned docs, adding bulk removal per topic.
pub fn topic_router<S>(service: DocService<TopicId>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/by-topicId", delete(delete_docs_by_topic))
        .with_state(service.clone())
        .merge(router(service))
}

fn doc_id(raw: &str) -> Result<Uuid, ApiError> {
    parse_id("Doc id", Some(raw))
}

async fn read_docx(multipart: Multipart) -> Result<(FormData, Vec<u8>), ApiError> {
    let mut form = FormData::read(multipart).await?;
    let file = form.require_file("docxFile")?;
    validate_docx_content_type(file.content_type.as_deref())?;
    Ok((form, file.bytes))
}

async fn add_doc<O: RequestOwner>(
    State(service): State<DocService<O>>,
    Owner(owner): Owner<O>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<DocSummary<O>>), ApiError> {
    let (form, bytes) = read_docx(multipart).await?;
    let name = required("Doc name", form.text("name"))?;
    let doc = service.add_doc(&owner, name, bytes).await?;
    Ok((StatusCode::CREATED, Json(doc)))
}

async fn list_docs<O: RequestOwner>(
    State(service): State<DocService<O>>,
    Owner(owner): Owner<O>,
) -> Result<Json<Vec<DocSummary<O>>>, ApiError> {
    Ok(Json(service.list_docs(&owner).await?))
}

async fn get_pdf<O: RequestOwner>(
    State(service): State<DocService<O>>,
    Owner(owner): Owner<O>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let bytes = service.get_derived_file(doc_id(&id)?, &owner).await?;
    Ok(([(header::CONTENT_TYPE, defaults::PDF_MIME)], bytes))
}

async fn get_docx<O: RequestOwner>(
    State(service): State<DocService<O>>,
    Owner(owner): Owner<O>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let bytes = service.get_primary_file(doc_id(&id)?, &owner).await?;
    Ok(([(header::CONTENT_TYPE, defaults::DOCX_MIME)], bytes))
}

async fn rename_doc<O: RequestOwner>(
    State(service): State<DocService<O>>,
    Owner(owner): Owner<O>,
    Path(id): Path<String>,
    Query(params): Query<RenameParams>,
) -> Result<(StatusCode, Json<DocSummary<O>>), ApiError> {
    let id = doc_id(&id)?;
    let name = required("Doc name", params.name.as_deref())?;
    let doc = service.rename_doc(id, &owner, name).await?;
    Ok((StatusCode::ACCEPTED, Json(doc)))
}

async fn replace_file<O: RequestOwner>(
    State(service): State<DocService<O>>,
    Owner(owner): Owner<O>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<DocSummary<O>>), ApiError> {
    let id = doc_id(&id)?;
    let (_, bytes) = read_docx(multipart).await?;
    let doc = service.replace_file(id, &owner, bytes).await?;
    Ok((StatusCode::ACCEPTED, Json(doc)))
}

async fn delete_doc<O: RequestOwner>(
    State(service): State<DocService<O>>,
    Owner(owner): Owner<O>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    service.delete_doc(doc_id(&id)?, &owner).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_docs_by_topic(
    State(service): State<DocService<TopicId>>,
    Owner(topic_id): Owner<TopicId>,
) -> Result<StatusCode, ApiError> {
    service.delete_docs_by_topic(&topic_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
