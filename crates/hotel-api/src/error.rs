//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hotel_core::HotelError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// API error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Error code
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Fields that failed validation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            fields: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.fields = Some(fields);
        self
    }

    pub fn not_found(resource: &str) -> Self {
        Self::new("NOT_FOUND", format!("{resource} not found"))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn unauthorized() -> Self {
        Self::new("UNAUTHORIZED", "Invalid email or password")
    }

    pub fn internal_error() -> Self {
        Self::new("INTERNAL_ERROR", "Internal server error")
    }
}

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request body that could not be decoded; carries the decoder's reason
    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error("Validation failed for: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::not_found(&msg)),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ApiError::bad_request(msg)),
            AppError::MalformedBody(reason) => (
                StatusCode::BAD_REQUEST,
                ApiError::bad_request("Malformed request body").with_details(reason),
            ),
            AppError::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                ApiError::new("VALIDATION_ERROR", "Validation failed").with_fields(fields),
            ),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, ApiError::unauthorized()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, ApiError::new("FORBIDDEN", msg)),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, ApiError::new("CONFLICT", msg)),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, ApiError::internal_error())
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::new("DATABASE_ERROR", "Database operation failed"),
                )
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<HotelError> for AppError {
    fn from(err: HotelError) -> Self {
        match err {
            HotelError::NotFound { entity, id } => AppError::NotFound(format!("{entity} {id}")),
            HotelError::ValidationError { fields } => AppError::Validation(fields),
            HotelError::Forbidden(reason) => AppError::Forbidden(reason),
            HotelError::Conflict(msg) => AppError::Conflict(msg),
            HotelError::StorageError(msg) => AppError::Database(msg),
        }
    }
}
