//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Moto POS                               │
//! │                                                                         │
//! │  Handler → Result<T, ApiError>                                          │
//! │                                                                         │
//! │  ValidationError / bad JSON ─────────────────────► 400                  │
//! │  ProductNotFound / SaleNotFound / NotFound ──────► 404                  │
//! │  InsufficientStock / AlreadyReturned / dup SKU ──► 409                  │
//! │  IdGenerationFailed / storage fault ─────────────► 500 (details logged) │
//! │                                                                         │
//! │  Body is always {"error": "<message>"}                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The checkout screen matches on the message text of 409s, e.g.
//! `"Insufficient stock for Kampas Rem Depan"`, so those messages are
//! passed through unchanged.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use moto_core::{CoreError, ValidationError};
use moto_db::{DbError, EngineError};

/// Error returned from HTTP handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError {
            status,
            message: message.into(),
        }
    }

    /// 400 with the given message.
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, message)
    }

    /// 404 with the given message.
    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::CONFLICT, message)
    }

    /// 500 with a generic message. Log the cause before calling this.
    pub fn internal() -> Self {
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }

    /// 400 for a body that could not be read at all.
    pub fn invalid_body() -> Self {
        ApiError::bad_request("Invalid request body")
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.status.as_u16(), self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => ApiError::from(e),
            e @ (CoreError::ProductNotFound(_) | CoreError::SaleNotFound(_)) => {
                ApiError::not_found(e.to_string())
            }
            e @ (CoreError::InsufficientStock { .. } | CoreError::AlreadyReturned(_)) => {
                ApiError::conflict(e.to_string())
            }
            e @ CoreError::IdGenerationFailed { .. } => {
                error!(error = %e, "Sale id generation failed");
                ApiError::internal()
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, .. } => ApiError::not_found(format!("{} not found", entity)),
            e @ DbError::UniqueViolation { .. } => ApiError::conflict(e.to_string()),
            DbError::CheckViolation { message } | DbError::ForeignKeyViolation { message } => {
                // Validation should have caught this first
                error!(%message, "Constraint violation reached the database");
                ApiError::bad_request("Invalid value")
            }
            e => {
                // Log the actual error but return a generic message
                error!(error = %e, "Database operation failed");
                ApiError::internal()
            }
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Core(e) => e.into(),
            EngineError::Storage(e) => e.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(reason = %rejection.body_text(), "Rejected request body");
        ApiError::invalid_body()
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
