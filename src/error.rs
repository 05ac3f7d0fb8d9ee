//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache, its backing stores and the HTTP surface.
#[derive(Error, Debug)]
pub enum CacheError {
    /// A key that is not a string was passed to `put`
    #[error("Cache keys must be strings, got {0}")]
    InvalidKeyType(String),

    /// `put` was called without a value
    #[error("No value supplied for key: {0}")]
    MissingValue(String),

    /// The backing store reported that it did not persist the write
    #[error("Backing store rejected write for namespace: {0}")]
    PersistRejected(String),

    /// A cache was built without a backing store
    #[error("A backing store is required to open a cache")]
    MissingStore,

    /// The persisted snapshot of a namespace could not be decoded
    #[error("Corrupt snapshot for namespace '{namespace}': {reason}")]
    CorruptSnapshot { namespace: String, reason: String },

    /// Key not present (or expired) in the cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Backing store I/O failure
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backing store (de)serialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::InvalidKeyType(_)
            | CacheError::MissingValue(_)
            | CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::PersistRejected(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::MissingStore
            | CacheError::CorruptSnapshot { .. }
            | CacheError::Io(_)
            | CacheError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (CacheError::InvalidKeyType("number".into()), StatusCode::BAD_REQUEST),
            (CacheError::MissingValue("k".into()), StatusCode::BAD_REQUEST),
            (CacheError::NotFound("k".into()), StatusCode::NOT_FOUND),
            (
                CacheError::PersistRejected("cache".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (CacheError::MissingStore, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_error_messages() {
        let err = CacheError::CorruptSnapshot {
            namespace: "cache".into(),
            reason: "not an object".into(),
        };
        assert_eq!(
            err.to_string(),
            "Corrupt snapshot for namespace 'cache': not an object"
        );
        assert_eq!(
            CacheError::InvalidKeyType("boolean".into()).to_string(),
            "Cache keys must be strings, got boolean"
        );
    }
}
