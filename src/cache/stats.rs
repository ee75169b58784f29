//! Cache Statistics Module
//!
//! Tracks cache performance counters and builds point-in-time snapshots.

use serde::Serialize;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

// == Cache Stats ==
/// Monotonic cache counters. Never reset while the process lives.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Successful lookups
    pub hits: u64,
    /// Lookups that found nothing, found an expired entry, or ran while disabled
    pub misses: u64,
    /// Successful insertions
    pub sets: u64,
    /// Entries removed to satisfy the count or memory bound
    pub evictions: u64,
    /// Internal faults caught at an operation boundary
    pub errors: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_set(&mut self) {
        self.sets += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_error(&mut self) {
        self.errors += 1;
    }
}

// == Stats Snapshot ==
/// Point-in-time view of the cache, as served to monitoring.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub evictions: u64,
    pub errors: u64,
    pub hit_rate: f64,
    /// Current number of entries
    pub size: usize,
    pub memory_used_bytes: usize,
    pub memory_used_mb: f64,
    pub max_memory_bytes: usize,
    pub max_memory_mb: f64,
    pub max_entries: usize,
    pub ttl_seconds: u64,
    pub enabled: bool,
}

/// Live cache dimensions folded into a snapshot.
#[derive(Debug, Clone, Copy)]
pub struct Occupancy {
    pub size: usize,
    pub memory_used_bytes: usize,
    pub max_memory_bytes: usize,
    pub max_entries: usize,
    pub ttl_seconds: u64,
    pub enabled: bool,
}

impl StatsSnapshot {
    pub fn new(stats: &CacheStats, occupancy: Occupancy) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            sets: stats.sets,
            evictions: stats.evictions,
            errors: stats.errors,
            hit_rate: stats.hit_rate(),
            size: occupancy.size,
            memory_used_bytes: occupancy.memory_used_bytes,
            memory_used_mb: occupancy.memory_used_bytes as f64 / BYTES_PER_MB,
            max_memory_bytes: occupancy.max_memory_bytes,
            max_memory_mb: occupancy.max_memory_bytes as f64 / BYTES_PER_MB,
            max_entries: occupancy.max_entries,
            ttl_seconds: occupancy.ttl_seconds,
            enabled: occupancy.enabled,
        }
    }
}
