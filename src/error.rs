//! Error types for the PDF cache
//!
//! Provides unified error handling using thiserror. Cache operations catch
//! these at their public boundary; only the HTTP layer turns them into responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the PDF cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Entry's recorded size no longer matches its buffer
    #[error("Corrupted entry {key}: recorded {recorded} bytes, holds {actual} bytes")]
    CorruptedEntry {
        key: String,
        recorded: usize,
        actual: usize,
    },

    /// Memory accounting would underflow or drifted from the live entries
    #[error("Memory accounting fault: {0}")]
    MemoryAccounting(String),

    /// Portfolio content could not be fingerprinted
    #[error("Malformed content: {0}")]
    MalformedContent(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) | CacheError::MalformedContent(_) => {
                StatusCode::BAD_REQUEST
            }
            CacheError::CorruptedEntry { .. }
            | CacheError::MemoryAccounting(_)
            | CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the PDF cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let resp = CacheError::NotFound("k".into()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = CacheError::InvalidRequest("bad".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = CacheError::MemoryAccounting("drift".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_corrupted_entry_message() {
        let err = CacheError::CorruptedEntry {
            key: "abc".into(),
            recorded: 10,
            actual: 4,
        };
        let msg = err.to_string();
        assert!(msg.contains("abc"));
        assert!(msg.contains("10"));
        assert!(msg.contains("4"));
    }
}
