use crate::error::{ApiPath, ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::sync::Arc;

/// Corpus statistics (GET /api/rag/stats)
pub async fn stats(State(state): State<Arc<ServerState>>) -> ServerResult<impl IntoResponse> {
    let stats = state.orchestrator.store().get_stats().await?;
    Ok(Json(stats))
}

/// Remove one document (DELETE /api/rag/documents/{id})
pub async fn delete_document(
    State(state): State<Arc<ServerState>>,
    ApiPath(id): ApiPath<i64>,
) -> ServerResult<impl IntoResponse> {
    if !state.orchestrator.store().delete(id).await? {
        return Err(ServerError::DocumentNotFound(id));
    }
    tracing::info!(id, "document deleted");
    Ok(Json(json!({ "id": id, "deleted": true })))
}
