//! Numeric error codes attached to error logs.
//!
//! Clients only ever see the `{"error": "..."}` envelope; the codes exist so
//! log queries and alerts can group failures without parsing messages.
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! assert_eq!(ErrorCode::ValidationError.code(), 1001);
//! assert_eq!(ErrorCode::ValidationError.as_str(), "VALIDATION_ERROR");
//! ```

use strum::{AsRefStr, Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors (1000-1999)
    ValidationError,
    MissingBody,
    InvalidBody,
    NotFound,
    MethodNotAllowed,

    // Server errors (1500s)
    InternalError,
    ServiceUnavailable,

    // Database errors (2000-2999)
    DatabaseError,
}

impl ErrorCode {
    pub fn code(self) -> i32 {
        match self {
            ErrorCode::ValidationError => 1001,
            ErrorCode::MissingBody => 1002,
            ErrorCode::InvalidBody => 1003,
            ErrorCode::NotFound => 1004,
            ErrorCode::MethodNotAllowed => 1005,
            ErrorCode::InternalError => 1500,
            ErrorCode::ServiceUnavailable => 1503,
            ErrorCode::DatabaseError => 2001,
        }
    }

    pub fn as_str(&self) -> &str {
        self.as_ref()
    }
}
