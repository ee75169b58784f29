//! Request and Response models for the PDF cache API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{validate_key, KeyRequest, StoreQuery};
pub use responses::{
    DeleteResponse, ExistsResponse, HealthResponse, KeyResponse, RemovedResponse, StoreResponse,
};
