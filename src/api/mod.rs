//! API Module
//!
//! HTTP handlers and routing for the PDF cache's monitoring and admin API.
//! Renderers store and fetch PDFs through it; dashboards read stats and listings.

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
