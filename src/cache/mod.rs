//! Cache Module
//!
//! Provides the bounded in-memory PDF cache: TTL expiry, recency-based
//! eviction under entry-count and memory bounds, and key fingerprinting.

mod entry;
mod key;
mod stats;
mod store;


use std::sync::Arc;

use tokio::sync::RwLock;

// Re-export public types
pub use entry::{CacheEntry, EntryMetadata};
pub use key::{generate_content_hash, generate_key, RenderOptions};
pub use stats::{CacheStats, StatsSnapshot};
pub use store::{CacheConfig, EntryInfo, PdfCache};

/// Process-wide cache handle. Every mutating operation, `get` included,
/// goes through the write lock.
pub type SharedPdfCache = Arc<RwLock<PdfCache>>;

/// Wraps a cache for sharing between request handlers and the sweep task.
pub fn shared(cache: PdfCache) -> SharedPdfCache {
    Arc::new(RwLock::new(cache))
}

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;
