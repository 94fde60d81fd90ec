//! Test doubles shared by the pipeline integration tests.

#![allow(dead_code)]

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use mmrag::{
    DocumentStats, EmbeddingProvider, ProviderError, SearchResult, StoreError, StubProvider,
    VectorStore,
};

pub fn result(id: i64, content_type: &str, content: &str, distance: f32) -> SearchResult {
    SearchResult {
        id,
        content: content.into(),
        metadata: "{}".into(),
        content_type: content_type.into(),
        distance,
    }
}

/// One `search` invocation as seen by [`ScriptedStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCall {
    pub query: Vec<f32>,
    pub top_k: usize,
    pub content_type: Option<String>,
}

/// Store that returns a fixed result list (truncated to `top_k`) and records calls.
#[derive(Default)]
pub struct ScriptedStore {
    results: Vec<SearchResult>,
    failure: Option<String>,
    delay: Option<Duration>,
    calls: Mutex<Vec<SearchCall>>,
}

impl ScriptedStore {
    pub fn returning(results: Vec<SearchResult>) -> Self {
        Self {
            results,
            ..Default::default()
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            failure: Some(reason.into()),
            ..Default::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<SearchCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl VectorStore for ScriptedStore {
    async fn search(
        &self,
        query: &[f32],
        top_k: usize,
        content_type: Option<&str>,
    ) -> Result<Vec<SearchResult>, StoreError> {
        self.calls.lock().unwrap().push(SearchCall {
            query: query.to_vec(),
            top_k,
            content_type: content_type.map(str::to_string),
        });
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(reason) = &self.failure {
            return Err(StoreError::Backend(reason.clone()));
        }
        Ok(self
            .results
            .iter()
            .filter(|r| content_type.is_none_or(|tag| r.content_type == tag))
            .take(top_k)
            .cloned()
            .collect())
    }

    async fn get_stats(&self) -> Result<DocumentStats, StoreError> {
        Ok(DocumentStats::empty())
    }

    async fn delete(&self, _id: i64) -> Result<bool, StoreError> {
        Ok(false)
    }

    fn backend(&self) -> &'static str {
        "scripted"
    }
}

/// Wraps a [`StubProvider`] and sleeps before each call.
pub struct SlowProvider {
    pub inner: StubProvider,
    pub embed_delay: Duration,
    pub generate_delay: Duration,
}

#[async_trait]
impl EmbeddingProvider for SlowProvider {
    async fn embed(&self, text: &str, model: Option<&str>) -> Result<Vec<f32>, ProviderError> {
        tokio::time::sleep(self.embed_delay).await;
        self.inner.embed(text, model).await
    }

    async fn generate(&self, prompt: &str, model: Option<&str>) -> Result<String, ProviderError> {
        tokio::time::sleep(self.generate_delay).await;
        self.inner.generate(prompt, model).await
    }

    fn embedding_model(&self) -> &str {
        self.inner.embedding_model()
    }

    fn generation_model(&self) -> &str {
        self.inner.generation_model()
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }
}
