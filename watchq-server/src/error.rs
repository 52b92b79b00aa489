//! HTTP error type for watchq-server
//!
//! Maps the common error taxonomy onto status codes. Every error body has
//! the same shape: `{"error": {"code": "...", "message": "..."}}`.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;
use watchq_common::{Error, ResolutionError};

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// watchq-common error
    #[error(transparent)]
    Common(#[from] Error),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

fn classify(err: &Error) -> (StatusCode, &'static str) {
    match err {
        Error::InvalidInput(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        Error::Duplicate(_) => (StatusCode::BAD_REQUEST, "DUPLICATE"),
        Error::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        Error::Resolution(ResolutionError::Unavailable(_)) => {
            (StatusCode::NOT_FOUND, "VIDEO_UNAVAILABLE")
        }
        Error::Resolution(ResolutionError::Rejected(_)) => {
            (StatusCode::BAD_REQUEST, "RESOLUTION_REJECTED")
        }
        Error::Resolution(ResolutionError::Transport(_)) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "RESOLUTION_FAILED")
        }
        Error::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORE_ERROR"),
        Error::Io(_) | Error::Config(_) | Error::Internal(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
            ApiError::Common(ref err) => {
                let (status, code) = classify(err);
                (status, code, err.to_string())
            }
        };

        if status.is_server_error() {
            error!(code = error_code, "{}", message);
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_errors_map_to_status_codes() {
        let cases = [
            (Error::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (Error::Duplicate("x".into()), StatusCode::BAD_REQUEST),
            (Error::NotFound("x".into()), StatusCode::NOT_FOUND),
            (
                Error::Resolution(ResolutionError::Unavailable("x".into())),
                StatusCode::NOT_FOUND,
            ),
            (
                Error::Resolution(ResolutionError::Rejected("x".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                Error::Resolution(ResolutionError::Transport("x".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (Error::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }
}
