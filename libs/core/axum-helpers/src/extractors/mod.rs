//! JSON body extractors that reject with the standard error envelope.
//!
//! axum's `Json` answers with plain-text 415/422 responses. These extractors
//! answer every body problem with a 400 and `{"error": "..."}` instead, and
//! tell "no body" apart from "bad body".
//!
//! The `Content-Type` header is not checked; the body is always parsed as JSON.

use crate::errors::AppError;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub const BODY_REQUIRED: &str = "Request body is required";

/// JSON body where a missing body or a literal `null` counts as "no body".
///
/// ```ignore
/// async fn update(JsonBody(payload): JsonBody<UpdateProduct>) -> impl IntoResponse { ... }
/// ```
pub struct JsonBody<T>(pub T);

/// Like [`JsonBody`], but an empty object `{}` also counts as "no body".
pub struct NonEmptyJsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = read_body(req, state).await?;
        parse_body(&bytes, true).map(JsonBody)
    }
}

impl<T, S> FromRequest<S> for NonEmptyJsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = read_body(req, state).await?;
        parse_body(&bytes, false).map(NonEmptyJsonBody)
    }
}

async fn read_body<S: Send + Sync>(req: Request, state: &S) -> Result<Bytes, AppError> {
    Bytes::from_request(req, state)
        .await
        .map_err(|e| AppError::InvalidBody(format!("Invalid request body: {}", e.body_text())))
}

fn parse_body<T: DeserializeOwned>(bytes: &[u8], allow_empty_object: bool) -> Result<T, AppError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::MissingBody(BODY_REQUIRED.to_string()));
    }

    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| AppError::InvalidBody(format!("Invalid request body: {e}")))?;

    // Only objects are payloads; serde would otherwise read arrays positionally.
    match &value {
        Value::Null => return Err(AppError::MissingBody(BODY_REQUIRED.to_string())),
        Value::Array(items) if items.is_empty() => {
            return Err(AppError::MissingBody(BODY_REQUIRED.to_string()));
        }
        Value::Object(map) if map.is_empty() && !allow_empty_object => {
            return Err(AppError::MissingBody(BODY_REQUIRED.to_string()));
        }
        Value::Object(_) => {}
        other => {
            return Err(AppError::InvalidBody(format!(
                "Invalid request body: expected a JSON object, found {}",
                json_kind(other)
            )));
        }
    }

    serde_json::from_value(value)
        .map_err(|e| AppError::InvalidBody(format!("Invalid request body: {e}")))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
