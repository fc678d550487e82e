//! Error Types for the bulkrest API
//!
//! This module defines error handling for the request layer:
//! - ApiError struct for structured error responses
//! - ErrorCode enum for categorizing errors
//! - BulkError for the bulk endpoints, whose error bodies are not wrapped
//!
//! ApiError is serialized as JSON with an appropriate HTTP status code.
//! Validation failures are returned as the raw per-field (or per-item) error
//! structure so clients can line errors up with the items they sent.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bulkrest_core::{BulkrestError, ConfigError, RecordError, StorageError, ValidationErrors};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
///
/// Each error code maps to a specific HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Validation Errors (400)
    // ========================================================================
    /// Request validation failed
    ValidationFailed,

    /// Request contains invalid input data
    InvalidInput,

    // ========================================================================
    // Not Found Errors (404)
    // ========================================================================
    /// Requested record does not exist
    EntityNotFound,

    // ========================================================================
    // Conflict Errors (409)
    // ========================================================================
    /// Record with the same key already exists
    EntityAlreadyExists,

    // ========================================================================
    // Server Errors (500)
    // ========================================================================
    /// Internal server error
    InternalError,

    /// Storage operation failed
    DatabaseError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationFailed | ErrorCode::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorCode::EntityNotFound => StatusCode::NOT_FOUND,
            ErrorCode::EntityAlreadyExists => StatusCode::CONFLICT,
            ErrorCode::InternalError | ErrorCode::DatabaseError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get a default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "Request validation failed",
            ErrorCode::InvalidInput => "Invalid input data",
            ErrorCode::EntityNotFound => "Record not found",
            ErrorCode::EntityAlreadyExists => "Record already exists",
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Storage operation failed",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error response for API operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create a new API error with the given code, using the default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self::new(code, code.default_message())
    }

    /// Add additional details to the error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // ========================================================================
    // Convenience constructors for common errors
    // ========================================================================

    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Create an EntityNotFound error for a resource and lookup key.
    pub fn entity_not_found(resource: &str, key: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::EntityNotFound,
            format!("{} with key {} not found", resource, key),
        )
    }

    pub fn entity_already_exists(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::EntityAlreadyExists, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn database_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(self)).into_response()
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match &err {
            StorageError::NotFound { resource, key } => ApiError::entity_not_found(resource, key),
            StorageError::InsertFailed { reason, .. } if reason.ends_with("already exists") => {
                tracing::warn!("Insert conflict: {}", err);
                ApiError::entity_already_exists(err.to_string())
            }
            StorageError::MissingKey { .. } | StorageError::LockPoisoned => {
                tracing::error!("Storage error: {:?}", err);
                ApiError::internal_error(err.to_string())
            }
            StorageError::InsertFailed { .. }
            | StorageError::UpdateFailed { .. }
            | StorageError::DeleteFailed { .. } => {
                tracing::error!("Storage error: {:?}", err);
                ApiError::database_error(err.to_string())
            }
        }
    }
}

impl From<RecordError> for ApiError {
    fn from(err: RecordError) -> Self {
        match &err {
            RecordError::Serialization { .. } => {
                tracing::error!("Record serialization error: {:?}", err);
                ApiError::internal_error(err.to_string())
            }
            RecordError::UnknownField { .. }
            | RecordError::InvalidValue { .. }
            | RecordError::Construction { .. } => {
                tracing::warn!("Record rejected validated data: {}", err);
                ApiError::invalid_input(err.to_string())
            }
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::invalid_input(err.to_string())
    }
}

impl From<BulkrestError> for ApiError {
    fn from(err: BulkrestError) -> Self {
        match err {
            BulkrestError::Storage(e) => e.into(),
            BulkrestError::Record(e) => e.into(),
            BulkrestError::Config(e) => e.into(),
        }
    }
}

// ============================================================================
// BULK ERROR
// ============================================================================

/// Failure of a create, update or destroy operation.
///
/// Validation errors and destroy rejections keep their bare response shape:
/// the error structure itself as the body, or no body at all.
#[derive(Debug, thiserror::Error)]
pub enum BulkError {
    #[error("validation failed for {} item(s)", .0.invalid_items())]
    Invalid(ValidationErrors),

    #[error("bulk destroy rejected: filtered collection is not distinct from the full collection")]
    DestroyRejected,

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl BulkError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            BulkError::Invalid(_) | BulkError::DestroyRejected => StatusCode::BAD_REQUEST,
            BulkError::Api(e) => e.status_code(),
        }
    }
}

impl From<StorageError> for BulkError {
    fn from(err: StorageError) -> Self {
        BulkError::Api(err.into())
    }
}

impl From<RecordError> for BulkError {
    fn from(err: RecordError) -> Self {
        BulkError::Api(err.into())
    }
}

impl IntoResponse for BulkError {
    fn into_response(self) -> Response {
        match self {
            BulkError::Invalid(errors) => (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
            BulkError::DestroyRejected => StatusCode::BAD_REQUEST.into_response(),
            BulkError::Api(e) => e.into_response(),
        }
    }
}
