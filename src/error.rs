use crate::models::Message;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::any::Any;
use thiserror::Error;

const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

/// Failures raised by the executor or while decoding the rows it returned.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("row decode: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("column `{0}` has an unsupported type")]
    UnsupportedColumn(String),
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed request input.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(&'static str),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self {
            ApiError::Storage(err) => {
                tracing::error!(error = %err, "storage failure");
                INTERNAL_ERROR_MESSAGE.to_string()
            }
            other => other.to_string(),
        };

        (status, Json(Message { message })).into_response()
    }
}

/// Response for a handler that panicked, handed to `CatchPanicLayer`.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = detail, "handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(Message {
            message: INTERNAL_ERROR_MESSAGE.to_string(),
        }),
    )
        .into_response()
}
