use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use core_types::CoreError;
use database::DbError;
use serde_json::json;
use thiserror::Error;

pub const TODO_NOT_FOUND: &str = "Todo not found";
pub const ROUTE_NOT_FOUND: &str = "Not found";
pub const INTERNAL_SERVER_ERROR: &str = "Internal server error";

#[derive(Error, Debug)]
pub enum AppError {
    /// Client data failed a precondition (e.g. a blank title).
    #[error("Validation error: {0}")]
    Validation(String),
    /// The request body could not be decoded.
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Unsupported content type: {0}")]
    UnsupportedMediaType(String),
    /// The request body exceeded the configured size limit.
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),
    #[error("Not found: {0}")]
    NotFound(String),
    /// A storage failure. `message` is what the client sees; `source` is only logged.
    #[error("{message}: {source}")]
    Database {
        message: &'static str,
        #[source]
        source: DbError,
    },
}

impl AppError {
    pub fn todo_not_found() -> Self {
        AppError::NotFound(TODO_NOT_FOUND.to_string())
    }

    /// Wraps a storage error with the client-facing message for the failed operation.
    pub fn database(message: &'static str) -> impl FnOnce(DbError) -> Self {
        move |source| AppError::Database { message, source }
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(message) => AppError::Validation(message),
        }
    }
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Validation(message) => (StatusCode::BAD_REQUEST, message),
            AppError::BadRequest(detail) => {
                tracing::debug!(%detail, "Rejected request body.");
                (StatusCode::BAD_REQUEST, "Invalid request body".to_string())
            }
            AppError::UnsupportedMediaType(content_type) => {
                tracing::debug!(%content_type, "Rejected request content type.");
                (
                    StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    "Unsupported content type".to_string(),
                )
            }
            AppError::PayloadTooLarge(detail) => {
                tracing::debug!(%detail, "Rejected oversized request body.");
                (
                    StatusCode::PAYLOAD_TOO_LARGE,
                    "Request body too large".to_string(),
                )
            }
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            AppError::Database { message, source } => {
                tracing::error!(error = ?source, "{}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, message.to_string())
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
