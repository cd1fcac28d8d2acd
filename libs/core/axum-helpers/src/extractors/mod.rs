//! Custom extractors for Axum handlers.
//!
//! Both reject with [`AppError`](crate::errors::AppError) so failures share
//! the JSON error body of the rest of the API.

pub mod object_id_path;
pub mod validated_json;

pub use object_id_path::ObjectIdPath;
pub use validated_json::ValidatedJson;
