//! Response DTOs for the PDF cache API
//!
//! Defines the structure of outgoing JSON response bodies. PDF payloads are
//! served raw, not through these types.

use serde::Serialize;

/// Response body for key generation (POST /keys)
#[derive(Debug, Clone, Serialize)]
pub struct KeyResponse {
    pub key: String,
    /// Hash of the supplied content, empty if none was supplied or it was malformed
    pub content_hash: String,
}

/// Response body for storing a PDF (PUT /entries/:key)
#[derive(Debug, Clone, Serialize)]
pub struct StoreResponse {
    pub key: String,
    /// False when caching is disabled or the store faulted
    pub stored: bool,
    pub size_bytes: usize,
}

/// Response body for an existence check (GET /entries/:key/exists)
#[derive(Debug, Clone, Serialize)]
pub struct ExistsResponse {
    pub key: String,
    pub exists: bool,
}

/// Response body for the DELETE operation (DELETE /entries/:key)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The key that was deleted
    pub key: String,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted successfully", key),
            key,
        }
    }
}

/// Response body for bulk removals (clear, sweep, portfolio invalidation)
#[derive(Debug, Clone, Serialize)]
pub struct RemovedResponse {
    pub message: String,
    pub removed: usize,
}

impl RemovedResponse {
    pub fn new(action: &str, removed: usize) -> Self {
        Self {
            message: format!("{}: {} entries removed", action, removed),
            removed,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
