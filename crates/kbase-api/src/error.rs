//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use kbase_core::ErrorKind;
use tracing::{error, warn};

/// Error returned by every handler; rendered as `{"error": "<message>"}`.
#[derive(Debug)]
pub enum ApiError {
    /// Failure reported by a service, mapped by its [`ErrorKind`].
    Core(kbase_core::Error),
    /// Malformed request (missing parameter, unparsable id, bad multipart).
    BadRequest(String),
    /// No usable caller identity.
    Unauthorized(String),
}

impl From<kbase_core::Error> for ApiError {
    fn from(err: kbase_core::Error) -> Self {
        ApiError::Core(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(err) => match err.kind() {
                ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::NameAlreadyTaken
                | ErrorKind::ReferentialIntegrityViolation
                | ErrorKind::ConversionFailed => StatusCode::CONFLICT,
                ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Core(err) => err.to_string(),
            ApiError::BadRequest(msg) | ApiError::Unauthorized(msg) => msg,
        };

        if status.is_server_error() {
            error!(
                subsystem = "api",
                status = status.as_u16(),
                error = %message,
                "Request failed"
            );
        } else {
            warn!(
                subsystem = "api",
                status = status.as_u16(),
                error = %message,
                "Request rejected"
            );
        }

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kbase_core::Error;
    use uuid::Uuid;

    #[test]
    fn test_status_by_kind() {
        let cases = [
            (Error::InvalidArgument("x".into()), StatusCode::BAD_REQUEST),
            (Error::DocNotFound(Uuid::nil()), StatusCode::NOT_FOUND),
            (Error::AnswerImageNotFound(Uuid::nil()), StatusCode::NOT_FOUND),
            (Error::TopicNameAlreadyTaken("Java".into()), StatusCode::CONFLICT),
            (Error::ReferentialIntegrityViolation("x".into()), StatusCode::CONFLICT),
            (Error::ConversionFailed("x".into()), StatusCode::CONFLICT),
            (Error::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn test_request_errors() {
        assert_eq!(
            ApiError::BadRequest("ID cannot be null".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthorized("missing token".into()).status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
