//! Configuration Module
//!
//! Handles loading and managing cache and server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::CacheConfig;

// == Defaults ==
const DEFAULT_TTL_SECS: u64 = 300;
const DEFAULT_MAX_ENTRIES: usize = 100;
const DEFAULT_MAX_MEMORY_BYTES: usize = 500 * 1024 * 1024;
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;
const DEFAULT_SERVER_PORT: u16 = 3000;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Whether PDF caching is active; when false the cache is a pass-through
    pub enabled: bool,
    /// Entry lifetime in seconds
    pub ttl_seconds: u64,
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// Maximum aggregate size of cached PDFs in bytes
    pub max_memory_bytes: usize,
    /// Background expiry sweep interval in seconds
    pub sweep_interval: u64,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `PDF_CACHE_ENABLED` - Disabled only by `false`/`0`/`no`/`off` (default: enabled)
    /// - `PDF_CACHE_TTL` - Entry TTL in seconds (default: 300)
    /// - `PDF_CACHE_MAX_ENTRIES` - Maximum cache entries (default: 100)
    /// - `PDF_CACHE_MAX_MEMORY` - Memory budget in bytes (default: 500 MiB)
    /// - `PDF_CACHE_SWEEP_INTERVAL` - Expiry sweep frequency in seconds (default: 60)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        Self {
            enabled: env::var("PDF_CACHE_ENABLED")
                .map(|v| parse_enabled(&v))
                .unwrap_or(true),
            ttl_seconds: env_or("PDF_CACHE_TTL", DEFAULT_TTL_SECS),
            max_entries: env_or("PDF_CACHE_MAX_ENTRIES", DEFAULT_MAX_ENTRIES),
            max_memory_bytes: env_or("PDF_CACHE_MAX_MEMORY", DEFAULT_MAX_MEMORY_BYTES),
            sweep_interval: env_or("PDF_CACHE_SWEEP_INTERVAL", DEFAULT_SWEEP_INTERVAL_SECS),
            server_port: env_or("SERVER_PORT", DEFAULT_SERVER_PORT),
        }
    }

    /// Extracts the settings the cache itself consumes.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            enabled: self.enabled,
            ttl: Duration::from_secs(self.ttl_seconds),
            max_entries: self.max_entries,
            max_memory_bytes: self.max_memory_bytes,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: DEFAULT_TTL_SECS,
            max_entries: DEFAULT_MAX_ENTRIES,
            max_memory_bytes: DEFAULT_MAX_MEMORY_BYTES,
            sweep_interval: DEFAULT_SWEEP_INTERVAL_SECS,
            server_port: DEFAULT_SERVER_PORT,
        }
    }
}

/// Reads and parses an environment variable, falling back to `default`
/// when it is unset or unparseable.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_enabled(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "false" | "0" | "no" | "off"
    )
}
