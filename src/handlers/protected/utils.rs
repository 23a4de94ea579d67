use axum::extract::{rejection::PathRejection, Path};

use crate::error::ApiError;

pub const NOT_FOUND: &str = "Not found.";

/// A path id that does not parse as an integer cannot name any row
pub fn record_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    path.map(|Path(id)| id).map_err(|rejection| {
        tracing::debug!("Unparseable record id: {}", rejection);
        ApiError::not_found(NOT_FOUND)
    })
}

pub fn not_found() -> ApiError {
    ApiError::not_found(NOT_FOUND)
}
