use crate::error::{ApiJson, ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct EmbedRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EmbedResponse {
    pub text: String,
    pub model: String,
    pub embedding: Vec<f32>,
    pub dimension: usize,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub prompt: String,
    pub model: String,
    pub response: String,
}

fn require(field: &str, value: &str) -> ServerResult<()> {
    if value.trim().is_empty() {
        return Err(ServerError::BadRequest(format!("{field} is required")));
    }
    Ok(())
}

/// Model actually used: the requested one, or the provider's default.
fn resolved(requested: Option<String>, default: &str) -> String {
    requested
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Embed a single text (POST /api/rag/embed)
pub async fn embed(
    State(state): State<Arc<ServerState>>,
    ApiJson(body): ApiJson<EmbedRequest>,
) -> ServerResult<impl IntoResponse> {
    require("text", &body.text)?;
    let provider = state.orchestrator.provider();
    let embedding = provider.embed(&body.text, body.model.as_deref()).await?;
    Ok(Json(EmbedResponse {
        model: resolved(body.model, provider.embedding_model()),
        dimension: embedding.len(),
        text: body.text,
        embedding,
    }))
}

/// Complete a raw prompt (POST /api/rag/generate)
pub async fn generate(
    State(state): State<Arc<ServerState>>,
    ApiJson(body): ApiJson<GenerateRequest>,
) -> ServerResult<impl IntoResponse> {
    require("prompt", &body.prompt)?;
    let provider = state.orchestrator.provider();
    let response = provider
        .generate(&body.prompt, body.model.as_deref())
        .await?;
    Ok(Json(GenerateResponse {
        model: resolved(body.model, provider.generation_model()),
        prompt: body.prompt,
        response,
    }))
}
