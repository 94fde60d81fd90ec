//! mmrag embedding and generation provider
//!
//! This crate turns text into fixed-dimension vectors and prompts into
//! generated text. Both capabilities sit behind one trait,
//! [`EmbeddingProvider`], so the query pipeline never knows which backend it
//! is talking to.
//!
//! Two implementations ship:
//!
//! - **Ollama** ([`OllamaProvider`]) - talks to an Ollama-compatible model
//!   server over HTTP (`/api/embed` and `/api/generate`).
//! - **Stub** ([`StubProvider`]) - deterministic hash-seeded vectors and a
//!   fixed answer. Used by tests and for running the server without a model
//!   server.
//!
//! Failures are never papered over: a failed embedding is an error, not an
//! empty vector.
//!
//! ## Quick example
//!
//! ```no_run
//! use provider::{build_provider, ProviderConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), provider::ProviderError> {
//!     let provider = build_provider(&ProviderConfig::default())?;
//!     let vector = provider.embed("What is photosynthesis?", None).await?;
//!     assert_eq!(vector.len(), provider.dimension());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod stub;

mod ollama;
mod types;

pub use crate::config::{ProviderConfig, ProviderMode};
pub use crate::error::ProviderError;
pub use crate::ollama::OllamaProvider;
pub use crate::stub::StubProvider;

use std::sync::Arc;

use async_trait::async_trait;

/// Capability interface for embedding and text generation.
///
/// Implementations must be safe to share across concurrently running
/// pipelines (`Send + Sync`) and must issue at most one outbound request per
/// call.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed `text` with `model`, or the default embedding model when `None`.
    ///
    /// Fails with [`ProviderError::EmptyInput`] for empty or whitespace-only
    /// text. On success the vector has exactly [`dimension`](Self::dimension)
    /// entries.
    async fn embed(&self, text: &str, model: Option<&str>) -> Result<Vec<f32>, ProviderError>;

    /// Generate a completion for `prompt` with `model`, or the default
    /// generation model when `None`. The prompt is passed through as-is.
    async fn generate(&self, prompt: &str, model: Option<&str>) -> Result<String, ProviderError>;

    /// Model used by [`embed`](Self::embed) when none is requested.
    fn embedding_model(&self) -> &str;

    /// Model used by [`generate`](Self::generate) when none is requested.
    fn generation_model(&self) -> &str;

    /// Length of every vector returned by [`embed`](Self::embed).
    fn dimension(&self) -> usize;
}

/// Build the provider selected by `cfg.mode`.
pub fn build_provider(cfg: &ProviderConfig) -> Result<Arc<dyn EmbeddingProvider>, ProviderError> {
    cfg.validate()?;
    match cfg.mode {
        ProviderMode::Ollama => Ok(Arc::new(OllamaProvider::new(cfg)?)),
        ProviderMode::Stub => Ok(Arc::new(StubProvider::from_config(cfg))),
    }
}

pub(crate) fn ensure_not_blank(text: &str) -> Result<(), ProviderError> {
    if text.trim().is_empty() {
        return Err(ProviderError::EmptyInput);
    }
    Ok(())
}

/// Requested model, falling back to `default` when absent or blank.
pub(crate) fn resolve_model<'a>(requested: Option<&'a str>, default: &'a str) -> &'a str {
    requested
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(default)
}
