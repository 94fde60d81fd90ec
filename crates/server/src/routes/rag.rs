use crate::error::{ApiJson, ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use mmrag::{QueryRequest, SearchResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Body shared by `/query` and `/search`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RagRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub top_k: Option<i64>,
    #[serde(default)]
    pub content_type: Option<String>,
}

impl RagRequest {
    /// Negative and zero `topK` are rejected here; JSON can carry both.
    fn top_k(&self) -> ServerResult<Option<usize>> {
        match self.top_k {
            None => Ok(None),
            Some(k) if k >= 1 => usize::try_from(k)
                .map(Some)
                .map_err(|_| ServerError::InvalidArgument(format!("topK {k} is too large"))),
            Some(k) => Err(ServerError::InvalidArgument(format!(
                "topK must be at least 1, got {k}"
            ))),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchResult>,
    pub count: usize,
}

/// Answer a question from the indexed corpus (POST /api/rag/query)
pub async fn query(
    State(state): State<Arc<ServerState>>,
    ApiJson(body): ApiJson<RagRequest>,
) -> ServerResult<impl IntoResponse> {
    let top_k = body.top_k()?;
    let request = QueryRequest {
        query: body.query,
        top_k,
        content_type: body.content_type,
    };
    let response = state.orchestrator.query(&request).await?;
    Ok(Json(response))
}

/// Nearest passages without generation (POST /api/rag/search)
pub async fn search(
    State(state): State<Arc<ServerState>>,
    ApiJson(body): ApiJson<RagRequest>,
) -> ServerResult<impl IntoResponse> {
    let top_k = body.top_k()?;
    let results = state
        .orchestrator
        .search(&body.query, top_k, body.content_type.as_deref())
        .await?;
    tracing::info!(results = results.len(), "search completed");
    Ok(Json(SearchResponse {
        count: results.len(),
        query: body.query,
        results,
    }))
}
