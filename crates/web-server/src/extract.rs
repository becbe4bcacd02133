use crate::error::AppError;
use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::{StatusCode, header::CONTENT_TYPE, request::Parts},
};
use serde::de::DeserializeOwned;

/// Request body extractor that accepts both `application/json` and
/// `application/x-www-form-urlencoded` payloads.
///
/// An empty body, or one sent without a content type, decodes as an empty
/// JSON object so that optional fields simply stay unset.
#[derive(Debug, Clone)]
pub struct JsonOrForm<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonOrForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_ascii_lowercase());

        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                AppError::PayloadTooLarge(rejection.body_text())
            } else {
                AppError::BadRequest(rejection.body_text())
            }
        })?;

        decode_body(content_type.as_deref(), &bytes).map(JsonOrForm)
    }
}

/// The `:id` path segment of a todo route.
///
/// Segments that are not integers, including ones that do not percent-decode
/// to UTF-8, cannot name a row and are rejected as "Todo not found".
#[derive(Debug, Clone, Copy)]
pub struct TodoId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for TodoId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                tracing::debug!(detail = %rejection.body_text(), "Rejected todo id.");
                AppError::todo_not_found()
            })?;
        parse_id(&raw).map(TodoId)
    }
}

fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.trim().parse::<i64>().map_err(|_| AppError::todo_not_found())
}

fn decode_body<T: DeserializeOwned>(content_type: Option<&str>, bytes: &[u8]) -> Result<T, AppError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return serde_json::from_slice(b"{}").map_err(|e| AppError::BadRequest(e.to_string()));
    }

    match content_type {
        Some(ct) if ct.starts_with("application/x-www-form-urlencoded") => {
            serde_urlencoded::from_bytes(bytes).map_err(|e| AppError::BadRequest(e.to_string()))
        }
        None => decode_json(bytes),
        Some(ct) if is_json(ct) => decode_json(bytes),
        Some(ct) => Err(AppError::UnsupportedMediaType(ct.to_string())),
    }
}

fn decode_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, AppError> {
    serde_json::from_slice(bytes).map_err(|e| AppError::BadRequest(e.to_string()))
}

/// Matches `application/json` and `+json` suffixed types such as `application/merge-patch+json`.
fn is_json(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or("").trim();
    essence == "application/json" || essence.ends_with("+json")
}
