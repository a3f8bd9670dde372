use axum::{
    http::{Method, StatusCode, Uri},
    response::Response,
};

use super::{ErrorCode, error_response};

/// Router fallback for unknown paths.
pub async fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

/// Fallback for known paths hit with an unsupported method.
pub async fn method_not_allowed(method: Method, uri: Uri) -> Response {
    let code = ErrorCode::MethodNotAllowed;
    tracing::info!(
        error_code = code.code(),
        kind = %code,
        %method,
        path = uri.path(),
        "Method not allowed"
    );
    error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}
