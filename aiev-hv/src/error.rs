//! Error types for aiev-hv

use aiev_common::Error as ReviewError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad request (400) - malformed or mistyped request body
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Rating value that is not an integer (400)
    #[error("Invalid rating: {0}")]
    InvalidRating(String),

    /// Path segment that cannot name an item (404)
    #[error("Unknown item: {0}")]
    UnknownItem(String),

    /// Conflict (409) - e.g., no evaluation has been run yet
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Review session or configuration error from aiev-common
    #[error(transparent)]
    Review(#[from] ReviewError),
}

impl ApiError {
    /// Status, machine-readable code and optional details for a review error
    fn review_parts(err: &ReviewError) -> (StatusCode, &'static str, Option<Value>) {
        match err {
            ReviewError::UnknownItem(_) => (StatusCode::NOT_FOUND, "UNKNOWN_ITEM", None),
            ReviewError::InvalidRating(_) => (StatusCode::BAD_REQUEST, "INVALID_RATING", None),
            ReviewError::OverrideNotAllowed(_) => {
                (StatusCode::BAD_REQUEST, "OVERRIDE_NOT_ALLOWED", None)
            }
            ReviewError::SubmissionBlocked {
                missing_ratings,
                missing_feedback,
            } => (
                StatusCode::CONFLICT,
                "SUBMISSION_BLOCKED",
                Some(json!({
                    "missing_ratings": missing_ratings,
                    "missing_feedback": missing_feedback,
                })),
            ),
            ReviewError::AlreadySubmitted => (StatusCode::CONFLICT, "ALREADY_SUBMITTED", None),
            ReviewError::NotSubmitted => (StatusCode::CONFLICT, "NOT_SUBMITTED", None),
            ReviewError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR", None),
            ReviewError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR", None),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg, None),
            ApiError::InvalidRating(ref value) => (
                StatusCode::BAD_REQUEST,
                "INVALID_RATING",
                format!("Invalid rating: {} (expected an integer 1-5)", value),
                None,
            ),
            ApiError::UnknownItem(ref id) => (
                StatusCode::NOT_FOUND,
                "UNKNOWN_ITEM",
                format!("Unknown item: {}", id),
                None,
            ),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg, None),
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg, None)
            }
            ApiError::Review(ref err) => {
                let (status, code, details) = Self::review_parts(err);
                (status, code, err.to_string(), details)
            }
        };

        if status.is_server_error() {
            tracing::error!(code = error_code, "{}", message);
        }

        let mut error = json!({
            "code": error_code,
            "message": message,
        });
        if let Some(details) = details {
            error["details"] = details;
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
