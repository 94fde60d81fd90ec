//! API route handlers
//!
//! - `rag`: question answering and similarity search
//! - `models`: direct access to the embedding and generation models
//! - `documents`: corpus statistics and deletion
//! - `health`: liveness, deployment info and metrics

pub mod documents;
pub mod health;
pub mod models;
pub mod rag;

use crate::error::{ServerError, ServerResult};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// API version and base info (GET /)
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "mmrag server",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/api/rag/query",
            "/api/rag/search",
            "/api/rag/embed",
            "/api/rag/generate",
            "/api/rag/stats",
            "/api/rag/health",
            "/api/rag/info",
            "/api/rag/documents/{id}",
            "/metrics"
        ]
    })))
}

/// 404 Not Found handler
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
