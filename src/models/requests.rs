//! Request DTOs for the PDF cache API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;
use serde_json::Value;

use crate::cache::{EntryMetadata, MAX_KEY_LENGTH};

/// Request body for key generation (POST /keys)
///
/// `options` is taken as untyped JSON so malformed values can be coerced to
/// their defaults instead of rejecting the request.
#[derive(Debug, Clone, Deserialize)]
pub struct KeyRequest {
    pub portfolio_id: String,
    pub template_id: String,
    /// Rendering options (`pageType`, `format`, `landscape`, `includeCaseStudies`, `contentHash`)
    #[serde(default)]
    pub options: Value,
    /// Portfolio document; when present its hash replaces `options.contentHash`
    #[serde(default)]
    pub content: Option<Value>,
}

impl KeyRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.portfolio_id.trim().is_empty() {
            return Some("portfolio_id cannot be empty".to_string());
        }
        if self.template_id.trim().is_empty() {
            return Some("template_id cannot be empty".to_string());
        }
        None
    }
}

/// Query string for storing a PDF (PUT /entries/:key)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreQuery {
    pub portfolio_id: Option<String>,
    pub template_id: Option<String>,
    pub filename: Option<String>,
}

impl StoreQuery {
    pub fn into_metadata(self) -> EntryMetadata {
        EntryMetadata {
            portfolio_id: self.portfolio_id,
            template_id: self.template_id,
            filename: self.filename,
            ..EntryMetadata::default()
        }
    }
}

/// Validates a cache key taken from the request path.
pub fn validate_key(key: &str) -> Option<String> {
    if key.is_empty() {
        return Some("Key cannot be empty".to_string());
    }
    if key.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        ));
    }
    None
}
