//! PDF Cache - bounded in-memory cache for rendered portfolio PDFs
//!
//! Caches PDFs by a fingerprint of portfolio, template and render options,
//! with TTL expiry and recency-based eviction under count and memory bounds.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{PdfCache, SharedPdfCache};
pub use config::Config;
pub use tasks::spawn_cleanup_task;
