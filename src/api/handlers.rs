//! API Handlers
//!
//! HTTP request handlers for each PDF cache endpoint.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use crate::cache::{
    self, generate_content_hash, generate_key, EntryInfo, PdfCache, RenderOptions,
    SharedPdfCache, StatsSnapshot,
};
use crate::error::{CacheError, Result};
use crate::models::{
    validate_key, DeleteResponse, ExistsResponse, HealthResponse, KeyRequest, KeyResponse,
    RemovedResponse, StoreQuery, StoreResponse,
};

/// Application state shared across all handlers.
///
/// Holds the process's single cache behind its lock.
#[derive(Clone)]
pub struct AppState {
    pub cache: SharedPdfCache,
}

impl AppState {
    /// Creates a new AppState around the given cache.
    pub fn new(pdf_cache: PdfCache) -> Self {
        Self {
            cache: cache::shared(pdf_cache),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(PdfCache::new(config.cache_config()))
    }
}

/// Handler for POST /keys
///
/// Builds the cache key for a portfolio rendering, folding in the content
/// hash when the portfolio document is supplied.
pub async fn key_handler(Json(req): Json<KeyRequest>) -> Result<Json<KeyResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let mut options = RenderOptions::from_value(&req.options);
    let content_hash = match &req.content {
        Some(content) => {
            let hash = generate_content_hash(content);
            options.content_hash = hash.clone();
            hash
        }
        None => String::new(),
    };

    let key = generate_key(&req.portfolio_id, &req.template_id, &options);
    Ok(Json(KeyResponse { key, content_hash }))
}

/// Handler for PUT /entries/:key
///
/// Stores the raw request body as the rendered PDF for `key`.
pub async fn store_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<StoreQuery>,
    body: Bytes,
) -> Result<Json<StoreResponse>> {
    if let Some(error_msg) = validate_key(&key) {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let size_bytes = body.len();
    let stored = {
        let mut cache = state.cache.write().await;
        cache.set(key.clone(), body, query.into_metadata())
    };

    Ok(Json(StoreResponse {
        key,
        stored,
        size_bytes,
    }))
}

/// Handler for GET /entries/:key
///
/// Serves the cached PDF bytes.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response> {
    // Write lock: lookups bump recency and may drop an expired entry
    let data = state.cache.write().await.get(&key);

    match data {
        Some(pdf) => Ok(([(header::CONTENT_TYPE, "application/pdf")], pdf).into_response()),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for GET /entries/:key/exists
pub async fn exists_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<ExistsResponse> {
    let exists = state.cache.read().await.has(&key);
    Json(ExistsResponse { key, exists })
}

/// Handler for DELETE /entries/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let removed = state.cache.write().await.delete(&key);

    if removed {
        Ok(Json(DeleteResponse::new(key)))
    } else {
        Err(CacheError::NotFound(key))
    }
}

/// Handler for DELETE /entries
pub async fn clear_handler(State(state): State<AppState>) -> Json<RemovedResponse> {
    let removed = state.cache.write().await.clear();
    Json(RemovedResponse::new("Cache cleared", removed))
}

/// Handler for DELETE /portfolios/:portfolio_id/entries
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Path(portfolio_id): Path<String>,
) -> Json<RemovedResponse> {
    let removed = state
        .cache
        .write()
        .await
        .invalidate_portfolio(&portfolio_id);
    Json(RemovedResponse::new(
        &format!("Portfolio {} invalidated", portfolio_id),
        removed,
    ))
}

/// Handler for POST /sweep
pub async fn sweep_handler(State(state): State<AppState>) -> Json<RemovedResponse> {
    let removed = state.cache.write().await.cleanup_expired();
    Json(RemovedResponse::new("Expired entries swept", removed))
}

/// Handler for GET /entries
pub async fn entries_handler(State(state): State<AppState>) -> Json<Vec<EntryInfo>> {
    Json(state.cache.read().await.entries_metadata())
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsSnapshot> {
    Json(state.cache.read().await.stats())
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
