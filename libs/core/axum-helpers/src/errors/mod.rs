pub mod codes;
pub mod handlers;

pub use codes::ErrorCode;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

/// Body of every error response.
///
/// ```json
/// { "error": "Must provide category, manufacturer and name." }
/// ```
#[derive(Debug, Serialize, Deserialize, ToSchema)]
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
/// Every variant is logged once, when it is turned into a response, with an
/// `error_code` field for monitoring.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Invalid id '{0}'")]
    InvalidObjectId(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),

    /// Store failure: `reason` is logged, only `message` reaches the client.
    #[error("Database error: {message}: {reason}")]
    Database { message: String, reason: String },

    #[error("Request timed out")]
    RequestTimeout,
}

impl AppError {
    /// Status code the error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            // A body over the size limit keeps its 413
            AppError::JsonExtractorRejection(JsonRejection::BytesRejection(e)) => e.status(),
            // Wrong content type and body shape errors are all client errors here,
            // including the 415/422 axum would pick on its own.
            AppError::JsonExtractorRejection(_)
            | AppError::Validation(_)
            | AppError::InvalidObjectId(_)
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalServerError(_) | AppError::Database { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match self {
            AppError::JsonExtractorRejection(e) => {
                tracing::warn!(
                    error_code = ErrorCode::JsonExtraction.code(),
                    "JSON extraction error: {:?}",
                    e
                );
                e.body_text()
            }
            AppError::Validation(e) => {
                tracing::info!(
                    error_code = ErrorCode::ValidationError.code(),
                    "Validation error: {:?}",
                    e
                );
                first_validation_message(&e)
            }
            AppError::InvalidObjectId(raw) => {
                tracing::info!(
                    error_code = ErrorCode::InvalidObjectId.code(),
                    "Invalid id: {}",
                    raw
                );
                format!("Invalid id '{raw}'")
            }
            AppError::BadRequest(msg) => {
                tracing::info!(error_code = ErrorCode::BadRequest.code(), "Bad request: {}", msg);
                msg
            }
            AppError::NotFound(msg) => {
                tracing::info!(error_code = ErrorCode::NotFound.code(), "Not found: {}", msg);
                msg
            }
            AppError::InternalServerError(msg) => {
                tracing::error!(
                    error_code = ErrorCode::InternalError.code(),
                    "Internal server error: {}",
                    msg
                );
                msg
            }
            AppError::Database { message, reason } => {
                tracing::error!(
                    error_code = ErrorCode::DatabaseError.code(),
                    %reason,
                    "{}",
                    message
                );
                message
            }
            AppError::RequestTimeout => {
                tracing::warn!(
                    error_code = ErrorCode::RequestTimeout.code(),
                    "Request timed out"
                );
                ErrorCode::RequestTimeout.default_message().to_string()
            }
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

/// Picks one message out of a set of validation failures.
///
/// Fields are visited in name order so the same payload always yields the
/// same message. Nested struct and list errors are not inspected.
fn first_validation_message(errors: &ValidationErrors) -> String {
    let field_errors = errors.field_errors();
    let mut fields: Vec<_> = field_errors.iter().collect();
    fields.sort_by(|(a, _), (b, _)| a.cmp(b));

    fields
        .into_iter()
        .flat_map(|(_, errors)| errors.iter())
        .find_map(|error| error.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| ErrorCode::ValidationError.default_message().to_string())
}
