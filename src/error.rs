//! Error types for the directory cache and its storage backends
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Storage Error Enum ==
/// Errors reported by a [`Storage`](crate::storage::Storage) implementation.
///
/// The cache-supplemented decorator passes these through untouched, so
/// callers see exactly what the underlying store reported.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Bucket or object does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bucket or object already exists
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// A conditional write lost against a concurrent writer
    #[error("412 Precondition Failed: {0}")]
    PreconditionFailed(String),

    /// Bucket still holds objects
    #[error("Bucket not empty: {0}")]
    BucketNotEmpty(String),

    /// Malformed arguments
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Channel or storage handle used after close
    #[error("Channel closed: {0}")]
    ChannelClosed(String),

    /// I/O failure while reading or writing a channel
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StorageError {
    /// HTTP status code this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            StorageError::NotFound(_) => StatusCode::NOT_FOUND,
            StorageError::AlreadyExists(_) => StatusCode::CONFLICT,
            StorageError::PreconditionFailed(_) => StatusCode::PRECONDITION_FAILED,
            StorageError::BucketNotEmpty(_) => StatusCode::CONFLICT,
            StorageError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            StorageError::ChannelClosed(_) => StatusCode::GONE,
            StorageError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            StorageError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for StorageError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_message() {
        let err = StorageError::PreconditionFailed("b/o".to_string());
        assert!(err.to_string().contains("412 Precondition Failed"));
        assert_eq!(err.status_code(), StatusCode::PRECONDITION_FAILED);
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe");
        let err: StorageError = io.into();
        assert!(matches!(err, StorageError::Io(_)));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_into_response_status() {
        let response = StorageError::NotFound("b".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
