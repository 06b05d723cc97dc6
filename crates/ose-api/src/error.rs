//! API error type and its HTTP mapping

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ose_confidence::ConfidenceError;
use ose_core::{OseError, Violation};
use ose_quality::ScoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

/// The only message a caller ever sees for a server-side failure
pub const INTERNAL_MESSAGE: &str = "internal server error";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid argument: {0}")]
    InvalidArgument(Violation),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Error body returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ErrorResponse {
    pub fn internal() -> Self {
        Self {
            code: "INTERNAL".to_string(),
            message: INTERNAL_MESSAGE.to_string(),
            field: None,
            suggestion: None,
        }
    }
}

impl ApiError {
    pub fn invalid(
        field: impl Into<String>,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        ApiError::InvalidArgument(Violation::new(field, message, suggestion))
    }

    pub fn unknown_pattern(pattern_id: &str) -> Self {
        ApiError::invalid(
            "patterns_applied",
            format!("unknown pattern {}", pattern_id),
            "Only report pattern ids returned by GenerateBlueprint or SearchPatterns",
        )
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::InvalidArgument(violation) => ErrorResponse {
                code: "INVALID_ARGUMENT".to_string(),
                message: violation.message,
                field: Some(violation.field),
                suggestion: Some(violation.suggestion),
            },
            ApiError::Internal(detail) => {
                error!(error = %detail, "request failed");
                ErrorResponse::internal()
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<OseError> for ApiError {
    fn from(err: OseError) -> Self {
        match err {
            OseError::Validation(violation) => ApiError::InvalidArgument(violation),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ScoreError> for ApiError {
    fn from(err: ScoreError) -> Self {
        ApiError::invalid(err.field(), err.to_string(), err.suggestion())
    }
}

impl From<ConfidenceError> for ApiError {
    fn from(err: ConfidenceError) -> Self {
        match err {
            ConfidenceError::UnknownPattern(pattern_id) => ApiError::unknown_pattern(&pattern_id),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid(
            "body",
            rejection.body_text(),
            "Send a JSON object with Content-Type: application/json",
        )
    }
}
