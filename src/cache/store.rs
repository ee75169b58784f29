//! Cache Store Module
//!
//! Main PDF cache engine: HashMap storage with TTL expiry, recency-based
//! eviction under count and memory bounds, and memory accounting.
//!
//! Every public method is infallible. Internal faults are counted in
//! `errors`, logged, and degrade the call to a miss or a no-op.

use std::collections::HashMap;
use std::time::Duration;

use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::entry::current_timestamp_ms;
use crate::cache::stats::Occupancy;
use crate::cache::{CacheEntry, CacheStats, EntryMetadata, StatsSnapshot};
use crate::error::{CacheError, Result};

// == Cache Config ==
/// Settings the cache is constructed with.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// When false, lookups always miss and stores are no-ops
    pub enabled: bool,
    /// Lifetime of every entry
    pub ttl: Duration,
    /// Upper bound on the number of entries
    pub max_entries: usize,
    /// Upper bound on the summed size of all entries
    pub max_memory_bytes: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: Duration::from_secs(300),
            max_entries: 100,
            max_memory_bytes: 500 * 1024 * 1024,
        }
    }
}

// == Entry Info ==
/// Observability listing row for a single entry.
#[derive(Debug, Clone, Serialize)]
pub struct EntryInfo {
    pub key: String,
    pub size_bytes: usize,
    pub size_kb: f64,
    pub age_seconds: u64,
    pub expires_in_seconds: u64,
    pub access_count: u64,
    pub portfolio_id: Option<String>,
    pub template_id: Option<String>,
    pub filename: Option<String>,
}

// == PDF Cache ==
/// Bounded in-memory cache of rendered PDFs.
#[derive(Debug)]
pub struct PdfCache {
    entries: HashMap<String, CacheEntry>,
    /// Sum of `size` over all live entries
    current_memory: usize,
    stats: CacheStats,
    config: CacheConfig,
    /// Last issued touch sequence
    seq: u64,
}

impl PdfCache {
    // == Constructor ==
    /// Creates an empty cache. `max_entries` is raised to at least 1.
    pub fn new(mut config: CacheConfig) -> Self {
        config.max_entries = config.max_entries.max(1);
        Self {
            entries: HashMap::new(),
            current_memory: 0,
            stats: CacheStats::new(),
            config,
            seq: 0,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // == Get ==
    /// Returns the cached PDF for `key` if present and not expired.
    ///
    /// A hit refreshes the entry's recency. Expired entries are removed on sight.
    pub fn get(&mut self, key: &str) -> Option<Bytes> {
        self.get_at(key, current_timestamp_ms())
    }

    fn get_at(&mut self, key: &str, now: u64) -> Option<Bytes> {
        if !self.config.enabled {
            self.stats.record_miss();
            return None;
        }

        match self.lookup(key, now) {
            Ok(Some(data)) => {
                self.stats.record_hit();
                debug!(key = %key, "PDF cache hit");
                Some(data)
            }
            Ok(None) => {
                self.stats.record_miss();
                debug!(key = %key, "PDF cache miss");
                None
            }
            Err(e) => {
                self.fault(&e);
                None
            }
        }
    }

    fn lookup(&mut self, key: &str, now: u64) -> Result<Option<Bytes>> {
        let (corruption, expired) = match self.entries.get(key) {
            Some(entry) => (entry.verify(key).err(), entry.is_expired_at(now)),
            None => return Ok(None),
        };

        if let Some(err) = corruption {
            self.remove_entry(key)?;
            return Err(err);
        }
        if expired {
            self.remove_entry(key)?;
            debug!(key = %key, "Dropped expired PDF on lookup");
            return Ok(None);
        }

        let seq = self.next_seq();
        let entry = self
            .entries
            .get_mut(key)
            .ok_or_else(|| CacheError::Internal(format!("entry {} vanished during lookup", key)))?;
        entry.touch(now, seq);
        Ok(Some(entry.data.clone()))
    }

    // == Set ==
    /// Stores a rendered PDF under `key`, evicting as needed.
    ///
    /// Returns false if the cache is disabled or an internal fault occurred.
    /// A PDF larger than the whole memory budget is still stored after
    /// everything else has been evicted.
    pub fn set(&mut self, key: String, data: Bytes, metadata: EntryMetadata) -> bool {
        self.set_at(key, data, metadata, current_timestamp_ms())
    }

    fn set_at(&mut self, key: String, data: Bytes, metadata: EntryMetadata, now: u64) -> bool {
        if !self.config.enabled {
            return false;
        }

        match self.store(key, data, metadata, now) {
            Ok(()) => {
                self.stats.record_set();
                true
            }
            Err(e) => {
                self.fault(&e);
                false
            }
        }
    }

    fn store(&mut self, key: String, data: Bytes, metadata: EntryMetadata, now: u64) -> Result<()> {
        let size = data.len();

        // Overwrite is delete + insert
        self.remove_entry(&key)?;

        while self.current_memory.saturating_add(size) > self.config.max_memory_bytes {
            if !self.evict_least_recent()? {
                warn!(
                    key = %key,
                    size,
                    max_memory = self.config.max_memory_bytes,
                    "PDF exceeds the cache memory budget on its own"
                );
                break;
            }
        }

        if self.entries.len() >= self.config.max_entries {
            self.evict_least_recent()?;
        }

        let memory = self.current_memory.checked_add(size).ok_or_else(|| {
            CacheError::MemoryAccounting(format!(
                "adding {} bytes to {} bytes overflows",
                size, self.current_memory
            ))
        })?;

        let seq = self.next_seq();
        let entry = CacheEntry::new(data, metadata, self.config.ttl, now, seq);
        self.entries.insert(key.clone(), entry);
        self.current_memory = memory;

        debug!(key = %key, size, memory = self.current_memory, "Cached PDF");
        Ok(())
    }

    // == Delete ==
    /// Removes the entry for `key`. Returns whether an entry was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        match self.remove_entry(key) {
            Ok(removed) => removed.is_some(),
            Err(e) => {
                // remove_entry only fails after the entry is gone
                self.fault(&e);
                true
            }
        }
    }

    /// The single removal path shared by expiry, eviction and invalidation.
    fn remove_entry(&mut self, key: &str) -> Result<Option<CacheEntry>> {
        let Some(entry) = self.entries.remove(key) else {
            return Ok(None);
        };

        match self.current_memory.checked_sub(entry.size) {
            Some(memory) => {
                self.current_memory = memory;
                Ok(Some(entry))
            }
            None => {
                let tracked = self.current_memory;
                self.current_memory = self.recount_memory();
                Err(CacheError::MemoryAccounting(format!(
                    "removing {} ({} bytes) from {} bytes tracked",
                    key, entry.size, tracked
                )))
            }
        }
    }

    fn evict_least_recent(&mut self) -> Result<bool> {
        let victim = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.recency())
            .map(|(key, _)| key.clone());

        let Some(key) = victim else {
            return Ok(false);
        };

        let removed = self.remove_entry(&key);
        self.stats.record_eviction();
        debug!(key = %key, "Evicted least recently accessed PDF");
        removed.map(|_| true)
    }

    // == Clear ==
    /// Drops every entry. Counters are kept. Returns the number of entries dropped.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        self.current_memory = 0;
        info!("PDF cache cleared: {} entries dropped", count);
        count
    }

    // == Invalidate Portfolio ==
    /// Removes every entry rendered from `portfolio_id`. Returns the count removed.
    pub fn invalidate_portfolio(&mut self, portfolio_id: &str) -> usize {
        let keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.metadata.belongs_to(portfolio_id))
            .map(|(key, _)| key.clone())
            .collect();

        let count = self.remove_keys(keys);
        if count > 0 {
            info!(portfolio_id = %portfolio_id, "Invalidated {} cached PDFs", count);
        }
        count
    }

    // == Cleanup Expired ==
    /// Removes all expired entries. Returns the number removed.
    pub fn cleanup_expired(&mut self) -> usize {
        self.cleanup_expired_at(current_timestamp_ms())
    }

    fn cleanup_expired_at(&mut self, now: u64) -> usize {
        let keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        self.remove_keys(keys)
    }

    fn remove_keys(&mut self, keys: Vec<String>) -> usize {
        let mut count = 0;
        for key in keys {
            match self.remove_entry(&key) {
                Ok(Some(_)) => count += 1,
                Ok(None) => {}
                Err(e) => {
                    self.fault(&e);
                    count += 1;
                }
            }
        }
        count
    }

    // == Has ==
    /// Returns true if a live entry exists for `key`. Does not touch recency or counters.
    pub fn has(&self, key: &str) -> bool {
        let now = current_timestamp_ms();
        self.entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired_at(now))
    }

    // == Stats ==
    /// Returns a snapshot of counters and occupancy.
    pub fn stats(&self) -> StatsSnapshot {
        StatsSnapshot::new(
            &self.stats,
            Occupancy {
                size: self.entries.len(),
                memory_used_bytes: self.current_memory,
                max_memory_bytes: self.config.max_memory_bytes,
                max_entries: self.config.max_entries,
                ttl_seconds: self.config.ttl.as_secs(),
                enabled: self.config.enabled,
            },
        )
    }

    // == Entries Metadata ==
    /// Lists every entry, most recently accessed first.
    pub fn entries_metadata(&self) -> Vec<EntryInfo> {
        let now = current_timestamp_ms();
        let mut rows: Vec<(&String, &CacheEntry)> = self.entries.iter().collect();
        rows.sort_by_key(|(_, entry)| std::cmp::Reverse(entry.recency()));

        rows.into_iter()
            .map(|(key, entry)| EntryInfo {
                key: key.clone(),
                size_bytes: entry.size,
                size_kb: entry.size as f64 / 1024.0,
                age_seconds: entry.age_ms(now) / 1000,
                expires_in_seconds: entry.ttl_remaining_ms(now) / 1000,
                access_count: entry.access_count,
                portfolio_id: entry.metadata.portfolio_id.clone(),
                template_id: entry.metadata.template_id.clone(),
                filename: entry.metadata.filename.clone(),
            })
            .collect()
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bytes currently accounted to live entries.
    pub fn memory_used(&self) -> usize {
        self.current_memory
    }

    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    fn recount_memory(&self) -> usize {
        self.entries.values().map(|entry| entry.size).sum()
    }

    fn fault(&mut self, err: &CacheError) {
        self.stats.record_error();
        warn!(error = %err, "PDF cache fault");
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    fn config(max_entries: usize, max_memory_bytes: usize, ttl: Duration) -> CacheConfig {
        CacheConfig {
            enabled: true,
            ttl,
            max_entries,
            max_memory_bytes,
        }
    }

    fn store(max_entries: usize) -> PdfCache {
        PdfCache::new(config(max_entries, 1024 * 1024, Duration::from_secs(60)))
    }

    fn pdf(len: usize) -> Bytes {
        Bytes::from(vec![b'%'; len])
    }

    fn meta(portfolio_id: &str) -> EntryMetadata {
        EntryMetadata::new(portfolio_id, "classic")
    }

    fn live_sum(cache: &PdfCache) -> usize {
        cache.entries.values().map(|e| e.data.len()).sum()
    }

    #[test]
    fn test_store_new() {
        let cache = store(10);
        assert!(cache.is_empty());
        assert_eq!(cache.memory_used(), 0);
    }

    #[test]
    fn test_max_entries_clamped() {
        let cache = PdfCache::new(config(0, 1024, Duration::from_secs(1)));
        assert_eq!(cache.config().max_entries, 1);
    }

    #[test]
    fn test_miss_then_hit() {
        let mut cache = store(10);

        assert!(cache.get("k").is_none());
        assert_eq!(cache.stats().misses, 1);

        assert!(cache.set("k".into(), pdf(10), meta("p1")));
        assert_eq!(cache.get("k"), Some(pdf(10)));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.sets, 1);
        assert_eq!(stats.size, 1);
        assert_eq!(stats.memory_used_bytes, 10);
        assert_eq!(stats.hit_rate, 0.5);
    }

    #[test]
    fn test_get_bumps_access_count() {
        let mut cache = store(10);
        cache.set("k".into(), pdf(3), meta("p1"));

        cache.get("k");
        cache.get("k");

        assert_eq!(cache.entries["k"].access_count, 2);
        assert_eq!(cache.entries_metadata()[0].access_count, 2);
    }

    #[test]
    fn test_ttl_expiration() {
        let mut cache = PdfCache::new(config(10, 1024, Duration::from_millis(50)));
        cache.set("k".into(), pdf(8), meta("p1"));
        assert!(cache.has("k"));

        sleep(Duration::from_millis(120));

        assert!(!cache.has("k"));
        assert!(cache.get("k").is_none());
        let stats = cache.stats();
        assert_eq!(stats.size, 0);
        assert_eq!(stats.memory_used_bytes, 0);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_expiry_is_lazy_and_strict() {
        let mut cache = PdfCache::new(config(10, 1024, Duration::from_millis(100)));
        cache.set_at("k".into(), pdf(1), meta("p1"), 1_000);

        assert!(cache.get_at("k", 1_100).is_some(), "Alive exactly at expires_at");
        assert!(cache.get_at("k", 1_101).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_overwrite_does_not_double_count() {
        let mut cache = store(10);
        cache.set("k".into(), pdf(100), meta("p1"));
        cache.set("k".into(), pdf(40), meta("p1"));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.memory_used(), 40);
        assert_eq!(cache.get("k"), Some(pdf(40)));
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_overwrite_at_capacity_keeps_others() {
        let mut cache = store(2);
        cache.set("a".into(), pdf(1), meta("p1"));
        cache.set("b".into(), pdf(1), meta("p1"));
        cache.set("a".into(), pdf(2), meta("p1"));

        assert!(cache.has("a"));
        assert!(cache.has("b"));
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_count_eviction_least_recently_accessed() {
        let mut cache = store(3);
        cache.set("a".into(), pdf(1), meta("p1"));
        cache.set("b".into(), pdf(1), meta("p1"));
        cache.set("c".into(), pdf(1), meta("p1"));

        cache.get("a");
        cache.set("d".into(), pdf(1), meta("p1"));

        assert_eq!(cache.len(), 3);
        assert!(!cache.has("b"));
        assert!(cache.has("a"));
        assert!(cache.has("c"));
        assert!(cache.has("d"));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_eviction_orders_by_timestamp_before_sequence() {
        let mut cache = store(2);
        cache.set_at("a".into(), pdf(1), meta("p1"), 5_000);
        cache.set_at("b".into(), pdf(1), meta("p1"), 1_000);

        // "b" carries the later sequence but the older timestamp
        cache.set_at("c".into(), pdf(1), meta("p1"), 6_000);

        assert!(cache.entries.contains_key("a"));
        assert!(!cache.entries.contains_key("b"));
    }

    #[test]
    fn test_memory_eviction() {
        let mut cache = PdfCache::new(config(10, 100, Duration::from_secs(60)));
        cache.set("a".into(), pdf(40), meta("p1"));
        cache.set("b".into(), pdf(40), meta("p1"));
        cache.get("a");

        // 80 + 30 > 100: evicting "b" alone frees enough
        cache.set("c".into(), pdf(30), meta("p1"));

        assert!(cache.has("a"));
        assert!(!cache.has("b"));
        assert!(cache.has("c"));
        assert_eq!(cache.memory_used(), 70);
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_memory_eviction_evicts_several() {
        let mut cache = PdfCache::new(config(10, 100, Duration::from_secs(60)));
        for key in ["a", "b", "c", "d"] {
            cache.set(key.into(), pdf(25), meta("p1"));
        }

        cache.set("big".into(), pdf(90), meta("p1"));

        assert_eq!(cache.len(), 1);
        assert!(cache.has("big"));
        assert_eq!(cache.memory_used(), 90);
        assert_eq!(cache.stats().evictions, 4);
    }

    #[test]
    fn test_oversized_entry_inserted_after_full_eviction() {
        let mut cache = PdfCache::new(config(10, 100, Duration::from_secs(60)));
        cache.set("a".into(), pdf(50), meta("p1"));

        assert!(cache.set("huge".into(), pdf(150), meta("p1")));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.memory_used(), 150);
        assert_eq!(cache.get("huge").map(|b| b.len()), Some(150));
    }

    #[test]
    fn test_delete() {
        let mut cache = store(10);
        cache.set("k".into(), pdf(12), meta("p1"));

        assert!(cache.delete("k"));
        assert!(!cache.delete("k"));
        assert_eq!(cache.memory_used(), 0);
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn test_clear_keeps_counters() {
        let mut cache = store(10);
        cache.set("a".into(), pdf(5), meta("p1"));
        cache.set("b".into(), pdf(5), meta("p1"));
        cache.get("a");

        assert_eq!(cache.clear(), 2);

        let stats = cache.stats();
        assert_eq!(stats.size, 0);
        assert_eq!(stats.memory_used_bytes, 0);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.sets, 2);
    }

    #[test]
    fn test_invalidate_portfolio() {
        let mut cache = store(10);
        cache.set("a1".into(), pdf(5), meta("A"));
        cache.set("a2".into(), pdf(5), meta("A"));
        cache.set("b1".into(), pdf(7), meta("B"));
        cache.set("untagged".into(), pdf(1), EntryMetadata::default());

        assert_eq!(cache.invalidate_portfolio("A"), 2);
        assert_eq!(cache.invalidate_portfolio("A"), 0);

        assert!(cache.get("b1").is_some());
        assert!(cache.has("untagged"));
        assert_eq!(cache.memory_used(), 8);
    }

    #[test]
    fn test_cleanup_expired_idempotent() {
        let mut cache = PdfCache::new(config(10, 1024, Duration::from_millis(100)));
        cache.set_at("old".into(), pdf(3), meta("p1"), 1_000);
        cache.set_at("new".into(), pdf(4), meta("p1"), 2_000);

        assert_eq!(cache.cleanup_expired_at(1_500), 1);
        assert_eq!(cache.cleanup_expired_at(1_500), 0);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.memory_used(), 4);
    }

    #[test]
    fn test_disabled_mode() {
        let mut cache = PdfCache::new(CacheConfig {
            enabled: false,
            ..CacheConfig::default()
        });

        for i in 0..20 {
            assert!(!cache.set(format!("k{}", i), pdf(10), meta("p1")));
            assert!(cache.get(&format!("k{}", i)).is_none());
        }

        let stats = cache.stats();
        assert_eq!(stats.size, 0);
        assert_eq!(stats.sets, 0);
        assert_eq!(stats.misses, 20);
        assert!(!stats.enabled);
    }

    #[test]
    fn test_corrupted_entry_counts_error() {
        let mut cache = store(10);
        cache.set("k".into(), pdf(10), meta("p1"));
        cache.entries.get_mut("k").unwrap().data = pdf(4);

        assert!(cache.get("k").is_none());

        let stats = cache.stats();
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.size, 0);
        assert_eq!(stats.memory_used_bytes, 0);
    }

    #[test]
    fn test_accounting_underflow_is_repaired() {
        let mut cache = store(10);
        cache.set("a".into(), pdf(10), meta("p1"));
        cache.set("b".into(), pdf(20), meta("p1"));
        cache.current_memory = 5;

        assert!(cache.delete("b"));

        assert_eq!(cache.stats().errors, 1);
        assert_eq!(cache.memory_used(), 10);
        assert_eq!(cache.memory_used(), live_sum(&cache));
    }

    #[test]
    fn test_stats_has_no_side_effects() {
        let mut cache = store(10);
        cache.set("k".into(), pdf(1), meta("p1"));

        let first = cache.stats();
        let second = cache.stats();
        assert!(cache.has("k"));
        let third = cache.stats();

        assert_eq!(first.hits, third.hits);
        assert_eq!(first.misses, second.misses);
        assert_eq!(second.misses, third.misses);
    }

    #[test]
    fn test_entries_metadata_listing() {
        let mut cache = store(10);
        cache.set(
            "a".into(),
            pdf(2048),
            EntryMetadata::new("p1", "modern").with_filename("p1.pdf"),
        );
        cache.set("b".into(), pdf(1), meta("p2"));
        cache.get("a");

        let rows = cache.entries_metadata();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].key, "a");
        assert_eq!(rows[0].size_kb, 2.0);
        assert_eq!(rows[0].portfolio_id.as_deref(), Some("p1"));
        assert_eq!(rows[0].filename.as_deref(), Some("p1.pdf"));
        assert!(rows[0].expires_in_seconds <= 60);
        assert_eq!(rows[1].key, "b");
    }

    #[test]
    fn test_end_to_end_recency_scenario() {
        let mut cache = PdfCache::new(config(2, 1024 * 1024, Duration::from_secs(60)));

        cache.set("a".into(), pdf(10), meta("p1"));
        cache.set("b".into(), pdf(10), meta("p1"));
        cache.get("a");
        cache.set("c".into(), pdf(10), meta("p1"));

        assert!(cache.has("a"));
        assert!(!cache.has("b"));
        assert!(cache.has("c"));
        assert_eq!(cache.stats().evictions, 1);
        assert_eq!(cache.memory_used(), 20);
    }
}
