use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use fxhash::hash64;

use crate::{ensure_not_blank, resolve_model, EmbeddingProvider, ProviderConfig, ProviderError};

const DEFAULT_ANSWER: &str = "stub answer";

/// Deterministic, in-process [`EmbeddingProvider`].
///
/// Embeddings are sinusoids seeded from a hash of the input text and
/// L2-normalized, so identical text always maps to the identical vector.
/// Generation returns a fixed answer and records the prompt it was given.
/// Either operation can be made to fail for error-path tests.
pub struct StubProvider {
    dimension: usize,
    embedding_model: String,
    generation_model: String,
    answer: String,
    fixed_embedding: Option<Vec<f32>>,
    embed_failure: Option<String>,
    generate_failure: Option<String>,
    embed_calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl StubProvider {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            embedding_model: "stub-embed".into(),
            generation_model: "stub-generate".into(),
            answer: DEFAULT_ANSWER.into(),
            fixed_embedding: None,
            embed_failure: None,
            generate_failure: None,
            embed_calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Stub that reports the configured model names and dimension.
    pub fn from_config(cfg: &ProviderConfig) -> Self {
        Self {
            embedding_model: cfg.embedding_model.clone(),
            generation_model: cfg.generation_model.clone(),
            ..Self::new(cfg.dimension)
        }
    }

    /// Answer returned by every `generate` call.
    pub fn with_answer(mut self, answer: impl Into<String>) -> Self {
        self.answer = answer.into();
        self
    }

    /// Return `vector` from every `embed` call instead of the hash-derived one.
    /// The provider's dimension becomes `vector.len()`.
    pub fn with_fixed_embedding(mut self, vector: Vec<f32>) -> Self {
        self.dimension = vector.len();
        self.fixed_embedding = Some(vector);
        self
    }

    pub fn failing_embed(mut self, reason: impl Into<String>) -> Self {
        self.embed_failure = Some(reason.into());
        self
    }

    pub fn failing_generate(mut self, reason: impl Into<String>) -> Self {
        self.generate_failure = Some(reason.into());
        self
    }

    /// Number of `embed` calls that got past input validation.
    pub fn embed_calls(&self) -> usize {
        self.embed_calls.load(Ordering::SeqCst)
    }

    /// Prompts received by `generate`, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn generate_calls(&self) -> usize {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl EmbeddingProvider for StubProvider {
    async fn embed(&self, text: &str, _model: Option<&str>) -> Result<Vec<f32>, ProviderError> {
        ensure_not_blank(text)?;
        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = &self.embed_failure {
            return Err(ProviderError::Injected(reason.clone()));
        }
        if let Some(vector) = &self.fixed_embedding {
            return Ok(vector.clone());
        }
        Ok(stub_vector(text, self.dimension))
    }

    async fn generate(&self, prompt: &str, model: Option<&str>) -> Result<String, ProviderError> {
        let model = resolve_model(model, &self.generation_model);
        tracing::debug!(model, bytes = prompt.len(), "stub generation");
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt.to_string());
        if let Some(reason) = &self.generate_failure {
            return Err(ProviderError::Injected(reason.clone()));
        }
        Ok(self.answer.clone())
    }

    fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    fn generation_model(&self) -> &str {
        &self.generation_model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Hash-seeded sinusoid vector of length `dimension`, scaled to unit length.
pub fn stub_vector(text: &str, dimension: usize) -> Vec<f32> {
    let seed = hash64(text.as_bytes());
    let mut v: Vec<f32> = (0..dimension)
        .map(|idx| ((seed >> (idx % 32)) as f32 * 0.0001 + idx as f32).sin())
        .collect();
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter_mut().for_each(|x| *x /= norm);
    }
    v
}
