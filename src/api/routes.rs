//! API Routes
//!
//! Configures the Axum router with all PDF cache endpoints.

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_handler, delete_handler, entries_handler, exists_handler, get_handler, health_handler,
    invalidate_handler, key_handler, stats_handler, store_handler, sweep_handler, AppState,
};

/// Largest PDF accepted by PUT /entries/:key
pub const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Health check endpoint
/// - `GET /stats` - Cache statistics snapshot
/// - `POST /keys` - Build a cache key (and content hash) for a rendering
/// - `GET /entries` - List cached entries
/// - `DELETE /entries` - Clear the cache
/// - `PUT /entries/:key` - Store a rendered PDF
/// - `GET /entries/:key` - Fetch a cached PDF
/// - `DELETE /entries/:key` - Delete a cached PDF
/// - `GET /entries/:key/exists` - Check for a live entry
/// - `DELETE /portfolios/:portfolio_id/entries` - Invalidate a portfolio's PDFs
/// - `POST /sweep` - Remove expired entries now
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
/// - Body limit: raised to `MAX_UPLOAD_BYTES` for PDF uploads
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route("/keys", post(key_handler))
        .route("/entries", get(entries_handler).delete(clear_handler))
        .route(
            "/entries/:key",
            get(get_handler).put(store_handler).delete(delete_handler),
        )
        .route("/entries/:key/exists", get(exists_handler))
        .route("/portfolios/:portfolio_id/entries", delete(invalidate_handler))
        .route("/sweep", post(sweep_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
