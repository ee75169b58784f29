//! Cache Entry Module
//!
//! Defines a cached PDF buffer together with its expiry, recency and lookup metadata.

use std::collections::BTreeMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::{CacheError, Result};

// == Entry Metadata ==
/// Free-form tags attached to a cached PDF.
///
/// Only `portfolio_id` is ever consulted, by bulk invalidation. None of it
/// affects eviction order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMetadata {
    pub portfolio_id: Option<String>,
    pub template_id: Option<String>,
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl EntryMetadata {
    pub fn new(portfolio_id: impl Into<String>, template_id: impl Into<String>) -> Self {
        Self {
            portfolio_id: Some(portfolio_id.into()),
            template_id: Some(template_id.into()),
            ..Self::default()
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Returns true if this entry was rendered from the given portfolio.
    pub fn belongs_to(&self, portfolio_id: &str) -> bool {
        self.portfolio_id.as_deref() == Some(portfolio_id)
    }
}

// == Cache Entry ==
/// A rendered PDF held by the cache.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The PDF bytes
    pub data: Bytes,
    /// Byte length of `data`, captured at insert time
    pub size: usize,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
    /// Last successful lookup, or creation time (Unix milliseconds)
    pub last_accessed: u64,
    /// Cache-wide touch sequence; orders entries touched within the same millisecond
    pub access_seq: u64,
    /// Number of successful lookups
    pub access_count: u64,
    pub metadata: EntryMetadata,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry expiring `ttl` after `now`.
    pub fn new(data: Bytes, metadata: EntryMetadata, ttl: Duration, now: u64, seq: u64) -> Self {
        let size = data.len();
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);

        Self {
            data,
            size,
            created_at: now,
            expires_at: now.saturating_add(ttl_ms),
            last_accessed: now,
            access_seq: seq,
            access_count: 0,
            metadata,
        }
    }

    // == Is Expired ==
    /// An entry is expired once `now` is strictly past its expiration time.
    pub fn is_expired_at(&self, now: u64) -> bool {
        now > self.expires_at
    }

    /// Checks expiry against the wall clock.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    // == Touch ==
    /// Records a successful lookup.
    pub fn touch(&mut self, now: u64, seq: u64) {
        self.last_accessed = now;
        self.access_seq = seq;
        self.access_count += 1;
    }

    /// Eviction ordering key: oldest access first.
    pub fn recency(&self) -> (u64, u64) {
        (self.last_accessed, self.access_seq)
    }

    // == Verify ==
    /// Checks that the recorded size still matches the buffer.
    pub fn verify(&self, key: &str) -> Result<()> {
        if self.size != self.data.len() {
            return Err(CacheError::CorruptedEntry {
                key: key.to_string(),
                recorded: self.size,
                actual: self.data.len(),
            });
        }
        Ok(())
    }

    /// Milliseconds since the entry was stored.
    pub fn age_ms(&self, now: u64) -> u64 {
        now.saturating_sub(self.created_at)
    }

    /// Milliseconds until expiry, 0 once expired.
    pub fn ttl_remaining_ms(&self, now: u64) -> u64 {
        self.expires_at.saturating_sub(now)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
///
/// A clock set before the epoch reads as 0.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
