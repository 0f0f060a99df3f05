use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;
use thiserror::Error;

use crate::storage::StorageError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Multipart error: {0}")]
    MultipartError(String),

    #[error(transparent)]
    StorageError(#[from] StorageError),

    #[error(transparent)]
    DatabaseError(#[from] sqlx::Error),
}

/// Convert `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            AppError::MultipartError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::StorageError(err) => match err {
                StorageError::NotFound(name) => (StatusCode::NOT_FOUND, format!("Asset {} not found", name)),
                StorageError::InvalidName(name) => (StatusCode::BAD_REQUEST, format!("Invalid asset name {}", name)),
                other => {
                    tracing::error!("Storage Error: {}", other);
                    (StatusCode::INTERNAL_SERVER_ERROR, "Storage error".to_string())
                }
            },
            AppError::DatabaseError(err) => {
                tracing::error!("Database Error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }
        };

        let body = Json(json!({"error": error_message}));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_errors_map_to_statuses() {
        let missing = AppError::from(StorageError::NotFound("a.png".into())).into_response();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let invalid = AppError::from(StorageError::InvalidName("../a".into())).into_response();
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let failed = AppError::from(StorageError::UploadError("connection refused".into())).into_response();
        assert_eq!(failed.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
