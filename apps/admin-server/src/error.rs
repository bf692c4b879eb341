//! # Error Handling
//!
//! Errors returned by admin handlers, rendered as JSON.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Error Flow                                     │
//! │                                                                         │
//! │  storefront-core          storefront-db            admin-server         │
//! │  ───────────────          ─────────────            ────────────         │
//! │  ValidationError ──┐                                                    │
//! │  CoreError ────────┼────► DbError::Rule ──────┐                         │
//! │                    │      DbError::* ─────────┼───► ApiError            │
//! │                    └──────────────────────────┘         │               │
//! │                                                         ▼               │
//! │                              (status, {"error": code, "message": ..})   │
//! │                                                                         │
//! │  400 validation / rule / CHECK   404 not found   409 unique / FK        │
//! │  500 everything else (logged, generic message)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use storefront_core::{CoreError, ValidationError};
use storefront_db::DbError;

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Validation,
    NotFound,
    Conflict,
    Internal,
}

impl ErrorCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Validation => "validation_error",
            ErrorCode::NotFound => "not_found",
            ErrorCode::Conflict => "conflict",
            ErrorCode::Internal => "internal_error",
        }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            ErrorCode::Validation => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// API error type with automatic HTTP status mapping.
#[derive(Debug)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Validation, message)
    }

    pub fn not_found(entity: &str, id: &str) -> Self {
        Self::new(ErrorCode::NotFound, format!("{} not found: {}", entity, id))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match self.code {
            ErrorCode::Internal => {
                // Log the actual error, return generic message
                error!(message = %self.message, "Internal error");
                "an internal error occurred".to_string()
            }
            _ => self.message,
        };

        let body = json!({
            "error": self.code.as_str(),
            "message": message,
        });

        (self.code.status(), Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => ApiError::new(ErrorCode::NotFound, err.to_string()),
            DbError::Duplicate { .. } | DbError::ForeignKey(_) => {
                ApiError::new(ErrorCode::Conflict, err.to_string())
            }
            DbError::Check(_) => ApiError::validation(err.to_string()),
            DbError::Rule(rule) => rule.into(),
            other => ApiError::internal(other.to_string()),
        }
    }
}

/// Result type for admin handlers.
pub type ApiResult<T> = Result<T, ApiError>;
