use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::ErrorResponse;

/// Fallback for unknown routes, so a 404 carries the same JSON shape as every other error.
pub async fn not_found() -> Response {
    let body = Json(ErrorResponse::new("Not found"));

    (StatusCode::NOT_FOUND, body).into_response()
}
