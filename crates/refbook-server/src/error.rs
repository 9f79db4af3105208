//! Error handling for the REST API server.

use axum::{
    extract::rejection::{PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use refbook_core::error::{ErrorCode, RefbookError};
use serde::Serialize;
use std::fmt;

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    // Common error constructors
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            ErrorCode::ValidationFailed.as_str(),
            message,
        )
    }

    pub fn not_found(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, code.as_str(), message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::Internal.as_str(),
            message,
        )
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.status, self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Error response body: `{"error": "...", "code": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.message,
            code: self.code,
        };

        (self.status, Json(body)).into_response()
    }
}

// Convert from refbook-core errors
impl From<RefbookError> for ApiError {
    fn from(err: RefbookError) -> Self {
        let code = err.code();
        match err {
            RefbookError::DirectoryNotFound { .. }
            | RefbookError::VersionNotFound { .. }
            | RefbookError::ElementNotFound { .. } => ApiError::not_found(code, err.to_string()),
            RefbookError::Validation { message } => ApiError::bad_request(message),
            RefbookError::Conflict { message, .. } => {
                ApiError::new(StatusCode::CONFLICT, code.as_str(), message)
            }
            other => {
                tracing::error!(error = %other, "Request failed");
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    code.as_str(),
                    other.to_string(),
                )
            }
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

/// Result type alias for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_variants_map_to_404() {
        let cases = [
            RefbookError::DirectoryNotFound { directory_id: 1 },
            RefbookError::VersionNotFound {
                directory_id: 1,
                label: None,
            },
            RefbookError::ElementNotFound {
                code: "E01".into(),
                value: "x".into(),
            },
        ];
        for err in cases {
            let api: ApiError = err.into();
            assert_eq!(api.status, StatusCode::NOT_FOUND);
        }
    }

    #[test]
    fn test_other_variants() {
        let api: ApiError = RefbookError::validation("bad").into();
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.code, "VALIDATION_ERROR");

        let api: ApiError = RefbookError::database("locked").into();
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.code, "DATABASE_ERROR");
    }
}
