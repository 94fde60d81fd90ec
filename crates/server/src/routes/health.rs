use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::Json;
use mmrag::ProviderMode;
use serde_json::json;
use std::sync::Arc;
use std::time::SystemTime;

pub const API_VERSION: &str = "1.0.0";

/// Global server start time for uptime calculation
static SERVER_START_TIME: once_cell::sync::Lazy<SystemTime> =
    once_cell::sync::Lazy::new(SystemTime::now);

/// Forces the start time to be taken now rather than on the first health request.
pub fn mark_started() {
    once_cell::sync::Lazy::force(&SERVER_START_TIME);
}

fn uptime_seconds() -> u64 {
    SERVER_START_TIME
        .elapsed()
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Health check endpoint (GET /api/rag/health)
pub async fn health_check(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.config.environment,
        "uptime_seconds": uptime_seconds(),
    }))
}

/// Deployment info (GET /api/rag/info)
pub async fn info(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let provider = &state.config.rag.provider;
    let ollama_base_url = match provider.mode {
        ProviderMode::Ollama => Some(provider.base_url.clone()),
        ProviderMode::Stub => None,
    };
    let orchestrator = &state.orchestrator;

    Json(json!({
        "api_version": API_VERSION,
        "ollama_base_url": ollama_base_url,
        "embedding_model": orchestrator.provider().embedding_model(),
        "text_model": orchestrator.provider().generation_model(),
        "vision_model": provider.vision_model,
        "default_top_k": orchestrator.config().default_top_k,
        "vector_dimension": orchestrator.provider().dimension(),
        "store": orchestrator.store().backend(),
    }))
}

/// Prometheus metrics endpoint (GET /metrics)
pub async fn metrics(State(state): State<Arc<ServerState>>) -> ServerResult<impl IntoResponse> {
    let handle = state.metrics.as_ref().ok_or(ServerError::NotFound)?;
    Ok((
        [(CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    ))
}
