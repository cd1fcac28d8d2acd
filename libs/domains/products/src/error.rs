use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use validator::ValidationErrors;

use crate::models::ProductId;

/// Client-facing message used until an operation attaches its own.
const DEFAULT_DATABASE_MESSAGE: &str = "Database error occurred";

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(ProductId),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    /// `reason` is the driver's text and is only logged; `message` goes to the client.
    #[error("{message}: {reason}")]
    Database {
        reason: String,
        message: &'static str,
    },
}

impl ProductError {
    pub fn database(reason: impl Into<String>) -> Self {
        ProductError::Database {
            reason: reason.into(),
            message: DEFAULT_DATABASE_MESSAGE,
        }
    }

    /// Replaces the client-facing message of a database error.
    pub fn context(self, message: &'static str) -> Self {
        match self {
            ProductError::Database { reason, .. } => ProductError::Database { reason, message },
            other => other,
        }
    }
}

pub type ProductResult<T> = Result<T, ProductError>;

/// Convert ProductError to AppError for standardized error responses
impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound(id) => AppError::NotFound(format!("Product {} not found", id)),
            ProductError::Validation(errors) => AppError::Validation(errors),
            ProductError::Database { reason, message } => AppError::Database {
                message: message.to_string(),
                reason,
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

impl From<mongodb::error::Error> for ProductError {
    fn from(err: mongodb::error::Error) -> Self {
        ProductError::database(err.to_string())
    }
}
