//! API error handling.
//!
//! This module provides error types and response formatting for the API.
//! Every failure leaves the service as a JSON body of the form
//! `{"code": ..., "message": ..., "details": [...]}`.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::domain::{UpdateError, ValidationError};
use crate::infrastructure::RepositoryError;

// =============================================================================
// API Error
// =============================================================================

/// API error structure for JSON responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional field-level errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

impl ApiError {
    /// Creates a new API error.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Attaches field-level details.
    #[must_use]
    pub fn with_details(self, details: Vec<FieldError>) -> Self {
        Self {
            details: Some(details),
            ..self
        }
    }
}

/// Field-level error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the offending field.
    pub field: String,
    /// Error message for this field.
    pub message: String,
}

impl FieldError {
    /// Creates a new field error.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

// =============================================================================
// API Error Response
// =============================================================================

/// API error response containing status code and error details.
#[derive(Debug, Clone)]
pub struct ApiErrorResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Error details.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// Creates a new API error response.
    #[must_use]
    pub const fn new(status: StatusCode, error: ApiError) -> Self {
        Self { status, error }
    }

    /// Creates a 400 Bad Request response.
    #[must_use]
    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ApiError::new(code, message))
    }

    /// Creates a 400 Bad Request response for validation errors.
    #[must_use]
    pub fn validation_error(message: impl Into<String>, details: Vec<FieldError>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            ApiError::new("VALIDATION_ERROR", message).with_details(details),
        )
    }

    /// Creates a 404 Not Found response.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", message))
    }

    /// Creates a 415 Unsupported Media Type response.
    #[must_use]
    pub fn unsupported_media_type(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::new("UNSUPPORTED_MEDIA_TYPE", message),
        )
    }

    /// Creates a 500 Internal Server Error response.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::new("INTERNAL_ERROR", message),
        )
    }

    /// Creates a 503 Service Unavailable response.
    #[must_use]
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            ApiError::new("SERVICE_UNAVAILABLE", message),
        )
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<RepositoryError> for ApiErrorResponse {
    fn from(error: RepositoryError) -> Self {
        // Details stay in the log; clients only see a generic message.
        tracing::error!(%error, "Repository operation failed");
        match error {
            RepositoryError::Unavailable(_) => {
                Self::service_unavailable("The database is temporarily unavailable")
            }
            RepositoryError::DatabaseError(_) => Self::internal_error("An internal error occurred"),
        }
    }
}

impl From<ValidationError> for ApiErrorResponse {
    fn from(error: ValidationError) -> Self {
        let details = error
            .violations
            .into_iter()
            .map(|violation| FieldError::new(violation.field, violation.message))
            .collect();
        Self::validation_error("Validation failed", details)
    }
}

impl From<UpdateError> for ApiErrorResponse {
    fn from(error: UpdateError) -> Self {
        tracing::debug!(%error, "Update rejected");
        match error {
            UpdateError::ImmutableField { field } => Self::new(
                StatusCode::BAD_REQUEST,
                ApiError::new("IMMUTABLE_FIELD", error.to_string())
                    .with_details(vec![FieldError::new(field, "field is read-only")]),
            ),
            UpdateError::TypeMismatch { field, expected } => Self::new(
                StatusCode::BAD_REQUEST,
                ApiError::new("TYPE_MISMATCH", error.to_string())
                    .with_details(vec![FieldError::new(field, format!("expected {expected}"))]),
            ),
            UpdateError::Validation(validation) => validation.into(),
        }
    }
}

impl From<JsonRejection> for ApiErrorResponse {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                Self::unsupported_media_type(rejection.body_text())
            }
            _ => Self::bad_request("BAD_REQUEST", rejection.body_text()),
        }
    }
}

impl From<PathRejection> for ApiErrorResponse {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request("BAD_REQUEST", rejection.body_text())
    }
}

impl From<QueryRejection> for ApiErrorResponse {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request("BAD_REQUEST", rejection.body_text())
    }
}

// =============================================================================
// Tests
// =============================================================================
