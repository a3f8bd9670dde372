pub mod codes;
pub mod handlers;
pub mod responses;

pub use codes::ErrorCode;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Body of every error response.
///
/// ```json
/// { "error": "Product not found" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Application error type that can be converted to HTTP responses.
///
/// The `Display` text is exactly what the client receives. Underlying causes
/// (`source`) are logged and never serialized.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    /// Failed input validation (400)
    #[error("{0}")]
    Validation(String),

    /// No usable request body (400)
    #[error("{0}")]
    MissingBody(String),

    /// Body present but not decodable (400)
    #[error("{0}")]
    InvalidBody(String),

    #[error("{0}")]
    NotFound(String),

    /// Store failure (500). `message` is the generic client-facing text.
    #[error("{message}")]
    Database {
        message: String,
        #[source]
        source: DbErr,
    },

    #[error("{0}")]
    Internal(String),

    #[error("{0}")]
    ServiceUnavailable(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::MissingBody(_) | AppError::InvalidBody(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database { .. } | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            AppError::Validation(_) => ErrorCode::ValidationError,
            AppError::MissingBody(_) => ErrorCode::MissingBody,
            AppError::InvalidBody(_) => ErrorCode::InvalidBody,
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::Database { .. } => ErrorCode::DatabaseError,
            AppError::Internal(_) => ErrorCode::InternalError,
            AppError::ServiceUnavailable(_) => ErrorCode::ServiceUnavailable,
        }
    }

    /// Log at a level matching the severity: client mistakes are `warn`,
    /// misses are `info`, server failures are `error` with their cause.
    fn log(&self) {
        let code = self.error_code();
        match self {
            AppError::Validation(msg) | AppError::MissingBody(msg) | AppError::InvalidBody(msg) => {
                tracing::warn!(error_code = code.code(), kind = %code, "Rejected request: {}", msg);
            }
            AppError::NotFound(msg) => {
                tracing::info!(error_code = code.code(), "Not found: {}", msg);
            }
            AppError::Database { message, source } => {
                tracing::error!(
                    error_code = code.code(),
                    cause = %source,
                    "{}: {:?}",
                    message,
                    source
                );
            }
            AppError::Internal(msg) => {
                tracing::error!(error_code = code.code(), "Internal server error: {}", msg);
            }
            AppError::ServiceUnavailable(msg) => {
                tracing::warn!(error_code = code.code(), "Service unavailable: {}", msg);
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        error_response(self.status(), self.to_string())
    }
}

/// Build an error response with the standard envelope.
///
/// ```rust,ignore
/// use axum_helpers::errors::error_response;
/// use axum::http::StatusCode;
///
/// let response = error_response(StatusCode::NOT_FOUND, "Product not found");
/// ```
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorResponse::new(message))).into_response()
}
