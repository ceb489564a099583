//! Error types for the mailsync HTTP API
//!
//! Every synchronization failure maps to one status code and a JSON body
//! with a `message`; validation failures also carry the field errors.
//! Deleting a list that still has members is a 400.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mailsync_core::validation::FieldErrors;
use serde::Serialize;
use thiserror::Error;

/// Errors returned by API handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Failure reported by a synchronizer
    #[error(transparent)]
    Sync(#[from] mailsync_core::Error),

    /// Request body is not a JSON object
    #[error("{0}")]
    MalformedBody(String),
}

/// Result alias for handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl ErrorResponse {
    fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            errors: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use mailsync_core::Error;

        let (status, body) = match self {
            ApiError::MalformedBody(message) => {
                (StatusCode::BAD_REQUEST, ErrorResponse::message(message))
            }
            ApiError::Sync(err) => match err {
                Error::ParentNotFound { .. } | Error::EntityNotFound { .. } => {
                    (StatusCode::NOT_FOUND, ErrorResponse::message(err.to_string()))
                }
                Error::ValidationFailed { errors } => (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        message: "Invalid data given".to_string(),
                        errors: Some(errors),
                    },
                ),
                Error::HasChildren { .. } => {
                    (StatusCode::BAD_REQUEST, ErrorResponse::message(err.to_string()))
                }
                Error::RemoteCallFailed(message) => {
                    (StatusCode::BAD_REQUEST, ErrorResponse::message(message))
                }
                other => {
                    tracing::error!(error = %other, "Request failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ErrorResponse::message("Internal server error"),
                    )
                }
            },
        };

        (status, Json(body)).into_response()
    }
}
