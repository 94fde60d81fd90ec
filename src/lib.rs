//! Workspace umbrella crate for mmrag, a retrieval-augmented query pipeline.
//!
//! [`Orchestrator`] answers a natural-language question in three stages:
//! embed the query, retrieve the nearest documents, then generate an answer
//! grounded in those documents. The two collaborators are injected as
//! [`EmbeddingProvider`] and [`VectorStore`] trait objects.
//!
//! ```
//! use std::sync::Arc;
//! use mmrag::{InMemoryStore, NewDocument, Orchestrator, PipelineConfig, QueryRequest, StubProvider};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = Arc::new(StubProvider::new(4).with_answer("Plants turn light into sugar."));
//! let store = Arc::new(InMemoryStore::new(4));
//! store.insert(NewDocument::new("Photosynthesis happens in chloroplasts.", "text", vec![0.5; 4]))?;
//!
//! let rag = Orchestrator::new(provider, store, PipelineConfig::default());
//! let response = rag.query(&QueryRequest::new("What is photosynthesis?")).await?;
//! assert_eq!(response.answer, "Plants turn light into sugar.");
//! assert_eq!(response.sources.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod prompt;

pub use crate::config::{ComponentError, ConfigLoadError, PipelineConfig, RagConfig};
pub use crate::error::{ErrorKind, PipelineError, PipelineStage};
pub use provider::{
    build_provider, EmbeddingProvider, OllamaProvider, ProviderConfig, ProviderError,
    ProviderMode, StubProvider,
};
pub use store::{
    build_store, DocumentStats, InMemoryStore, NewDocument, PgVectorStore, SearchResult,
    StoreBackend, StoreConfig, StoreError, VectorStore,
};

use std::error::Error as _;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::Instrument;

/// A question plus optional retrieval overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub query: String,
    /// Passages to retrieve; the pipeline default when `None`.
    #[serde(default)]
    pub top_k: Option<usize>,
    /// Restrict retrieval to this content type. Empty means no filter.
    #[serde(default)]
    pub content_type: Option<String>,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            top_k: None,
            content_type: None,
        }
    }

    pub fn top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Generated answer with the passages it was grounded on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub answer: String,
    /// Retrieved passages, nearest first, exactly as the store returned them.
    pub sources: Vec<SearchResult>,
    /// Wall-clock time of the whole run.
    pub processing_time_ms: u64,
}

/// Metrics observer for pipeline stages.
pub trait PipelineMetrics: Send + Sync {
    /// Called once per stage that was entered, successful or not.
    fn record_stage(&self, stage: PipelineStage, latency: Duration, ok: bool);
    /// Called once per `query` run, including runs rejected before dispatch.
    fn record_query(&self, latency: Duration, ok: bool);
}

struct MetricsSpan<'a> {
    recorder: &'a dyn PipelineMetrics,
    stage: PipelineStage,
    start: Instant,
}

impl<'a> MetricsSpan<'a> {
    fn start(recorder: Option<&'a Arc<dyn PipelineMetrics>>, stage: PipelineStage) -> Option<Self> {
        recorder.map(|recorder| Self {
            recorder: recorder.as_ref(),
            stage,
            start: Instant::now(),
        })
    }

    fn finish(self, ok: bool) {
        self.recorder
            .record_stage(self.stage, self.start.elapsed(), ok);
    }
}

/// Sequences embedding, retrieval and generation for one query at a time.
///
/// Holds no per-request state: a single instance behind an `Arc` serves any
/// number of concurrent runs. Dropping a run's future cancels it at the next
/// collaborator call boundary.
pub struct Orchestrator {
    provider: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    config: PipelineConfig,
    metrics: Option<Arc<dyn PipelineMetrics>>,
}

impl Orchestrator {
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            provider,
            store,
            config,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn PipelineMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the full pipeline, bounded by the configured request timeout if any.
    pub async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, PipelineError> {
        let deadline = self
            .config
            .request_timeout()
            .map(|timeout| tokio::time::Instant::now() + timeout);
        self.run_query(request, deadline).await
    }

    /// Run the full pipeline; every stage must finish before `deadline`.
    pub async fn query_with_deadline(
        &self,
        request: &QueryRequest,
        deadline: tokio::time::Instant,
    ) -> Result<QueryResponse, PipelineError> {
        self.run_query(request, Some(deadline)).await
    }

    /// Embed `query` and return the nearest passages without generating an answer.
    pub async fn search(
        &self,
        query: &str,
        top_k: Option<usize>,
        content_type: Option<&str>,
    ) -> Result<Vec<SearchResult>, PipelineError> {
        let deadline = self
            .config
            .request_timeout()
            .map(|timeout| tokio::time::Instant::now() + timeout);
        let top_k = self.validate(query, top_k)?;
        self.retrieve(query, top_k, content_type, deadline).await
    }

    async fn run_query(
        &self,
        request: &QueryRequest,
        deadline: Option<tokio::time::Instant>,
    ) -> Result<QueryResponse, PipelineError> {
        let started = Instant::now();
        let result = self.execute(request, deadline).await;
        let elapsed = started.elapsed();
        if let Some(metrics) = &self.metrics {
            metrics.record_query(elapsed, result.is_ok());
        }

        let (answer, sources) = result?;
        let processing_time_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        tracing::info!(
            sources = sources.len(),
            processing_time_ms,
            "rag query completed"
        );
        Ok(QueryResponse {
            answer,
            sources,
            processing_time_ms,
        })
    }

    async fn execute(
        &self,
        request: &QueryRequest,
        deadline: Option<tokio::time::Instant>,
    ) -> Result<(String, Vec<SearchResult>), PipelineError> {
        let top_k = self.validate(&request.query, request.top_k)?;
        tracing::info!(
            query_bytes = request.query.len(),
            top_k,
            content_type = ?request.content_type,
            "rag query started"
        );

        let sources = self
            .retrieve(
                &request.query,
                top_k,
                request.content_type.as_deref(),
                deadline,
            )
            .await?;

        let context = prompt::build_context(&sources);
        let prompt = prompt::build_prompt(&context, &request.query);
        let answer = self
            .run_stage(
                PipelineStage::Generating,
                deadline,
                self.provider.generate(&prompt, None),
                PipelineError::Generate,
            )
            .await?;
        Ok((answer, sources))
    }

    async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
        content_type: Option<&str>,
        deadline: Option<tokio::time::Instant>,
    ) -> Result<Vec<SearchResult>, PipelineError> {
        let embedding = self
            .run_stage(
                PipelineStage::Embedding,
                deadline,
                self.provider.embed(query, None),
                PipelineError::Embed,
            )
            .await?;

        let content_type = content_type.filter(|tag| !tag.is_empty());
        self.run_stage(
            PipelineStage::Retrieving,
            deadline,
            self.store.search(&embedding, top_k, content_type),
            PipelineError::Retrieve,
        )
        .await
    }

    fn validate(&self, query: &str, top_k: Option<usize>) -> Result<usize, PipelineError> {
        if query.trim().is_empty() {
            return Err(PipelineError::EmptyQuery);
        }
        match top_k.unwrap_or(self.config.default_top_k) {
            0 => Err(PipelineError::InvalidTopK),
            k => Ok(k),
        }
    }

    async fn run_stage<T, E, F>(
        &self,
        stage: PipelineStage,
        deadline: Option<tokio::time::Instant>,
        fut: F,
        wrap: fn(E) -> PipelineError,
    ) -> Result<T, PipelineError>
    where
        F: Future<Output = Result<T, E>>,
    {
        let span = MetricsSpan::start(self.metrics.as_ref(), stage);
        let fut = fut.instrument(tracing::info_span!("rag_stage", stage = stage.as_str()));

        let outcome = match deadline {
            Some(deadline) => match tokio::time::timeout_at(deadline, fut).await {
                Ok(result) => result.map_err(wrap),
                Err(_) => Err(PipelineError::DeadlineExceeded { stage }),
            },
            None => fut.await.map_err(wrap),
        };

        if let Some(span) = span {
            span.finish(outcome.is_ok());
        }
        if let Err(err) = &outcome {
            tracing::error!(
                stage = stage.as_str(),
                kind = ?err.kind(),
                error = %err,
                cause = err.source().map(tracing::field::display),
                "rag stage failed"
            );
        }
        outcome
    }
}
