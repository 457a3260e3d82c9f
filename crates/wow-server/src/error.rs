use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use wow_engine::{EngineError, ErrorKind};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("store error: {0}")]
    Store(#[from] wow_store::StoreError),

    #[error("ledger error: {0}")]
    Ledger(#[from] wow_ledger::LedgerError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

/// A failed request, rendered as a JSON body with a matching status.
#[derive(Debug)]
pub enum ApiError {
    Engine(EngineError),
    /// The request body could not be parsed at all.
    MalformedBody(String),
    /// A path parameter could not be parsed.
    MalformedPath(String),
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        Self::Engine(err)
    }
}

impl From<axum::extract::rejection::JsonRejection> for ApiError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        Self::MalformedBody(rejection.body_text())
    }
}

impl From<axum::extract::rejection::PathRejection> for ApiError {
    fn from(rejection: axum::extract::rejection::PathRejection) -> Self {
        Self::MalformedPath(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = match self {
            Self::MalformedBody(detail) => return malformed("Invalid request body", "body", detail),
            Self::MalformedPath(detail) => return malformed("Invalid path parameter", "id", detail),
            Self::Engine(err) => err,
        };

        let (status, body) = match (err.kind(), &err) {
            (ErrorKind::Validation, EngineError::Validation(fields)) => (
                StatusCode::BAD_REQUEST,
                json!({ "message": "Validation failed", "errors": fields }),
            ),
            (ErrorKind::NotFound, EngineError::NotFound { entity, .. }) => (
                StatusCode::NOT_FOUND,
                json!({ "message": not_found_message(entity) }),
            ),
            (ErrorKind::Transfer, EngineError::Transfer(cause)) => (
                StatusCode::BAD_REQUEST,
                json!({ "message": "Transaction failed", "error": cause.to_string() }),
            ),
            _ => {
                tracing::error!(error = %err, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": "Internal server error", "error": "unexpected error" }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

fn malformed(message: &str, field: &str, detail: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "message": message,
            "errors": [{ "field": field, "message": detail }],
        })),
    )
        .into_response()
}

fn not_found_message(entity: &str) -> String {
    let mut chars = entity.chars();
    match chars.next() {
        Some(first) => format!("{}{} not found", first.to_uppercase(), chars.as_str()),
        None => "Not found".to_string(),
    }
}
