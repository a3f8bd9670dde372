use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use sea_orm::DbErr;
use strum::{AsRefStr, Display};
use thiserror::Error;

pub const NOT_FOUND: &str = "Product not found";

/// Store operation that failed, used to pick the client-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
    Create,
    Fetch,
    List,
    Update,
    Delete,
}

impl Operation {
    /// Generic message returned to the caller; the cause is only logged.
    pub fn failure_message(self) -> &'static str {
        match self {
            Operation::Create => "Failed to create product",
            Operation::Fetch => "Failed to fetch product",
            Operation::List => "Failed to fetch products",
            Operation::Update => "Failed to update product",
            Operation::Delete => "Failed to delete product",
        }
    }
}

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Product not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("{}", .operation.failure_message())]
    Database {
        operation: Operation,
        #[source]
        source: DbErr,
    },
}

impl ProductError {
    pub fn database(operation: Operation) -> impl FnOnce(DbErr) -> Self {
        move |source| ProductError::Database { operation, source }
    }
}

pub type ProductResult<T> = Result<T, ProductError>;

impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound => AppError::NotFound(NOT_FOUND.to_string()),
            ProductError::Validation(msg) => AppError::Validation(msg),
            ProductError::Database { operation, source } => AppError::Database {
                message: operation.failure_message().to_string(),
                source,
            },
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_database_error_hides_cause() {
        let err = ProductError::database(Operation::Update)(DbErr::Custom("deadlock".into()));
        assert_eq!(err.to_string(), "Failed to update product");

        let app: AppError = err.into();
        assert_eq!(app.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(app.to_string(), "Failed to update product");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::from(ProductError::NotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(ProductError::Validation("x".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ProductError::NotFound.to_string(), "Product not found");
    }

    #[test]
    fn test_operation_messages() {
        assert_eq!(Operation::Create.failure_message(), "Failed to create product");
        assert_eq!(Operation::List.failure_message(), "Failed to fetch products");
        assert_eq!(Operation::Delete.as_ref(), "delete");
    }
}
