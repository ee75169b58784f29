//! Cache key generation.
//!
//! Keys are SHA-256 digests over a canonical JSON rendering of the inputs,
//! so field order in the caller's options never matters.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::error::{CacheError, Result};

pub const DEFAULT_PAGE_TYPE: &str = "portfolio";
pub const DEFAULT_FORMAT: &str = "A4";

// == Render Options ==
/// Recognized rendering options that distinguish one cached PDF from another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    pub page_type: String,
    pub format: String,
    pub landscape: bool,
    pub include_case_studies: bool,
    pub content_hash: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            page_type: DEFAULT_PAGE_TYPE.to_string(),
            format: DEFAULT_FORMAT.to_string(),
            landscape: false,
            include_case_studies: false,
            content_hash: String::new(),
        }
    }
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds options from an untyped JSON object.
    ///
    /// Missing fields and fields of the wrong JSON type fall back to their
    /// defaults; a non-object value yields all defaults.
    pub fn from_value(value: &Value) -> Self {
        let defaults = Self::default();
        let text = |name: &str, default: String| {
            value
                .get(name)
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or(default)
        };
        let flag = |name: &str, default: bool| {
            value.get(name).and_then(Value::as_bool).unwrap_or(default)
        };

        Self {
            page_type: text("pageType", defaults.page_type),
            format: text("format", defaults.format),
            landscape: flag("landscape", defaults.landscape),
            include_case_studies: flag("includeCaseStudies", defaults.include_case_studies),
            content_hash: text("contentHash", defaults.content_hash),
        }
    }

    pub fn with_page_type(mut self, page_type: impl Into<String>) -> Self {
        self.page_type = page_type.into();
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn with_landscape(mut self, landscape: bool) -> Self {
        self.landscape = landscape;
        self
    }

    pub fn with_case_studies(mut self, include: bool) -> Self {
        self.include_case_studies = include;
        self
    }

    pub fn with_content_hash(mut self, hash: impl Into<String>) -> Self {
        self.content_hash = hash.into();
        self
    }
}

// Field order here is the canonical order; do not reorder.
#[derive(Serialize)]
struct KeyMaterial<'a> {
    portfolio_id: &'a str,
    template_id: &'a str,
    page_type: &'a str,
    format: &'a str,
    landscape: bool,
    include_case_studies: bool,
    content_hash: &'a str,
}

#[derive(Serialize)]
struct ContentMaterial<'a> {
    title: &'a Value,
    content: &'a Value,
    styling: &'a Value,
    updated_at: &'a Value,
    case_study_count: usize,
}

fn digest<T: Serialize>(material: &T) -> String {
    let canonical = serde_json::to_vec(material).unwrap_or_default();
    hex::encode(Sha256::digest(&canonical))
}

// == Generate Key ==
/// Builds the cache key for one rendering of a portfolio.
///
/// Same logical inputs always produce the same key; any difference in a
/// recognized field produces a different one.
pub fn generate_key(portfolio_id: &str, template_id: &str, options: &RenderOptions) -> String {
    digest(&KeyMaterial {
        portfolio_id,
        template_id,
        page_type: &options.page_type,
        format: &options.format,
        landscape: options.landscape,
        include_case_studies: options.include_case_studies,
        content_hash: &options.content_hash,
    })
}

// == Generate Content Hash ==
/// Fingerprints the content-bearing fields of a portfolio document.
///
/// Returns an empty string when the document cannot be fingerprinted, which
/// leaves cached PDFs without content-based invalidation.
pub fn generate_content_hash(content: &Value) -> String {
    match content_fingerprint(content) {
        Ok(hash) => hash,
        Err(e) => {
            warn!(error = %e, "Failed to fingerprint portfolio content");
            String::new()
        }
    }
}

fn content_fingerprint(content: &Value) -> Result<String> {
    let doc = content
        .as_object()
        .ok_or_else(|| CacheError::MalformedContent("expected a JSON object".to_string()))?;

    let case_study_count = match doc.get("caseStudies") {
        None | Some(Value::Null) => 0,
        Some(Value::Array(items)) => items.len(),
        Some(Value::Object(items)) => items.len(),
        Some(other) => {
            return Err(CacheError::MalformedContent(format!(
                "caseStudies must be a list, got {}",
                other
            )))
        }
    };

    let field = |name: &str| doc.get(name).unwrap_or(&Value::Null);

    Ok(digest(&ContentMaterial {
        title: field("title"),
        content: field("content"),
        styling: field("styling"),
        updated_at: field("updatedAt"),
        case_study_count,
    }))
}
