//! Request owner extraction for doc routes.
//!
//! User-scoped deployments take the owner from the `sub` claim of the bearer
//! token. The token is expected to have been verified by the fronting
//! authentication proxy; only its payload is decoded here. Topic-scoped
//! deployments take the owner from the `topicId` query parameter.

use async_trait::async_trait;
use axum::extract::{FromRequestParts, Query};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use kbase_core::{OwnerKey, TopicId, UserId};
use serde::Deserialize;

use crate::error::ApiError;
use crate::params::parse_id;

/// An owner key that can be derived from an incoming request.
pub trait RequestOwner: OwnerKey {
    fn from_parts(parts: &Parts) -> Result<Self, ApiError>;
}

#[derive(Deserialize)]
struct Claims {
    sub: Option<String>,
}

/// Decode the `sub` claim of a compact JWT without verifying it.
pub fn subject_from_bearer(header: &str) -> Result<String, ApiError> {
    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Bearer token required".to_string()))?;

    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| ApiError::Unauthorized("Malformed bearer token".to_string()))?;
    let decoded = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|_| ApiError::Unauthorized("Malformed bearer token".to_string()))?;
    let claims: Claims = serde_json::from_slice(&decoded)
        .map_err(|_| ApiError::Unauthorized("Malformed bearer token".to_string()))?;

    match claims.sub {
        Some(sub) if !sub.is_empty() => Ok(sub),
        _ => Err(ApiError::Unauthorized(
            "Bearer token has no subject".to_string(),
        )),
    }
}

impl RequestOwner for UserId {
    fn from_parts(parts: &Parts) -> Result<Self, ApiError> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Bearer token required".to_string()))?;
        let subject = subject_from_bearer(header)?;
        Ok(UserId::new(subject)?)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TopicQuery {
    topic_id: Option<String>,
}

impl RequestOwner for TopicId {
    fn from_parts(parts: &Parts) -> Result<Self, ApiError> {
        let Query(query) = Query::<TopicQuery>::try_from_uri(&parts.uri)
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        parse_id("topicId", query.topic_id.as_deref()).map(TopicId)
    }
}

/// Extractor yielding the request's owner key.
pub struct Owner<O>(pub O);

#[async_trait]
impl<O, S> FromRequestParts<S> for Owner<O>
where
    O: RequestOwner,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        O::from_parts(parts).map(Owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn token(payload: &str) -> String {
        format!(
            "Bearer eyJhbGciOiJSUzI1NiJ9.{}.c2lnbmF0dXJl",
            URL_SAFE_NO_PAD.encode(payload)
        )
    }

    fn request_parts(builder: axum::http::request::Builder) -> Parts {
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_subject_from_bearer() {
        let header = token(r#"{"sub":"00u1abcd","email":"a@example.com"}"#);
        assert_eq!(subject_from_bearer(&header).unwrap(), "00u1abcd");
    }

    #[test]
    fn test_bearer_without_subject_is_unauthorized() {
        let header = token(r#"{"email":"a@example.com"}"#);
        assert!(matches!(
            subject_from_bearer(&header),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_non_bearer_header_is_unauthorized() {
        assert!(subject_from_bearer("Basic dXNlcjpwYXNz").is_err());
        assert!(subject_from_bearer("Bearer not-a-jwt").is_err());
    }

    #[test]
    fn test_user_owner_from_header() {
        let parts = request_parts(
            Request::builder()
                .uri("/api/v1/docs")
                .header(AUTHORIZATION, token(r#"{"sub":"alice"}"#)),
        );
        assert_eq!(UserId::from_parts(&parts).unwrap().as_str(), "alice");
    }

    #[test]
    fn test_topic_owner_from_query() {
        let id = uuid::Uuid::nil();
        let parts = request_parts(Request::builder().uri(format!("/api/v1/docs?topicId={}", id)));
        assert_eq!(TopicId::from_parts(&parts).unwrap(), TopicId(id));

        let parts = request_parts(Request::builder().uri("/api/v1/docs"));
        assert!(matches!(
            TopicId::from_parts(&parts),
            Err(ApiError::BadRequest(_))
        ));
    }
}
