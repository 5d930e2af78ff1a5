//! API Error Types
//!
//! Defines error types for the API layer and implements conversion
//! to HTTP responses with appropriate status codes.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::auth::AuthError;
use crate::covers::CoverError;
use crate::store::StoreError;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request validation failed
    #[error("{0}")]
    Validation(String),

    /// Missing or unusable credentials
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not allowed
    #[error("{0}")]
    Forbidden(String),

    /// Resource not found
    #[error("{0}")]
    NotFound(String),

    /// Authentication layer error
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Store layer error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Cover upload error
    #[error(transparent)]
    Cover(#[from] CoverError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    /// Status code, stable error code, and whether the message is safe to show
    fn classify(&self) -> (StatusCode, &'static str, bool) {
        match self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", true),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", true),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN", true),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", true),
            ApiError::Auth(e) => match e {
                AuthError::InvalidCredentials | AuthError::InvalidToken | AuthError::UnknownUser => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", true)
                }
                AuthError::WrongPassword | AuthError::WeakPassword(_) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", true)
                }
                AuthError::Store(inner) => store_status(inner),
                AuthError::Hashing(_) | AuthError::Token(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "AUTH_ERROR", false)
                }
            },
            ApiError::Store(e) => store_status(e),
            ApiError::Cover(e) => match e {
                CoverError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR", false),
                _ => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", true),
            },
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", false),
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR", false),
        }
    }
}

fn store_status(err: &StoreError) -> (StatusCode, &'static str, bool) {
    match err {
        StoreError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", true),
        StoreError::Conflict(_) => (StatusCode::BAD_REQUEST, "CONFLICT", true),
        StoreError::Invalid(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", true),
        StoreError::Sqlite(_) | StoreError::Io(_) | StoreError::Lock(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR", false)
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, public) = self.classify();

        let request_id = uuid::Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "API error occurred"
            );
        } else {
            tracing::debug!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "Request rejected"
            );
        }

        let message = if public {
            self.to_string()
        } else {
            "Internal server error".to_string()
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
            },
            request_id,
        };

        if status == StatusCode::UNAUTHORIZED {
            return (status, [(header::WWW_AUTHENTICATE, "Bearer")], Json(body)).into_response();
        }
        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (ApiError::NotFound("Book not found".into()), StatusCode::NOT_FOUND),
            (ApiError::Forbidden("no".into()), StatusCode::FORBIDDEN),
            (AuthError::InvalidCredentials.into(), StatusCode::UNAUTHORIZED),
            (AuthError::WrongPassword.into(), StatusCode::BAD_REQUEST),
            (
                StoreError::Conflict("dup".into()).into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                StoreError::NotFound("Cart item".into()).into(),
                StatusCode::NOT_FOUND,
            ),
            (
                StoreError::Lock("poisoned".into()).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (CoverError::InvalidBase64.into(), StatusCode::BAD_REQUEST),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err: ApiError = StoreError::Lock("secret detail".into()).into();
        let (_, _, public) = err.classify();
        assert!(!public);

        let err = ApiError::Validation("Cart is empty".into());
        assert_eq!(err.to_string(), "Cart is empty");
    }

    #[test]
    fn test_unauthorized_sets_challenge() {
        let response = ApiError::Unauthorized("Could not validate credentials".into()).into_response();
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }
}
