use std::error::Error as _;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::types::{EmbedRequest, EmbedResponse, GenerateRequest, GenerateResponse};
use crate::{ensure_not_blank, resolve_model, EmbeddingProvider, ProviderConfig, ProviderError};

const EMBED_PATH: &str = "api/embed";
const GENERATE_PATH: &str = "api/generate";

/// [`EmbeddingProvider`] backed by an Ollama-compatible model server.
///
/// Holds a single pooled [`reqwest::Client`]; clone-free sharing across tasks
/// goes through `Arc<dyn EmbeddingProvider>`. Every call is exactly one HTTP
/// request: there is no retry and no response caching.
pub struct OllamaProvider {
    client: Client,
    embed_url: Url,
    generate_url: Url,
    embedding_model: String,
    generation_model: String,
    dimension: usize,
}

impl OllamaProvider {
    /// Validate `cfg` and build the HTTP client.
    pub fn new(cfg: &ProviderConfig) -> Result<Self, ProviderError> {
        cfg.validate()?;
        let base_url = cfg.parsed_base_url()?;
        let embed_url = join(&base_url, EMBED_PATH)?;
        let generate_url = join(&base_url, GENERATE_PATH)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
            .pool_max_idle_per_host(32)
            .build()
            .map_err(|e| ProviderError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            embed_url,
            generate_url,
            embedding_model: cfg.embedding_model.clone(),
            generation_model: cfg.generation_model.clone(),
            dimension: cfg.dimension,
        })
    }

    async fn post_json<Req, Resp>(
        &self,
        operation: &'static str,
        url: &Url,
        body: &Req,
    ) -> Result<Resp, ProviderError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let response = self
            .client
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(|source| ProviderError::Transport { operation, source })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                operation,
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Resp>()
            .await
            .map_err(|e| ProviderError::malformed(operation, e.to_string()))
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    async fn embed(&self, text: &str, model: Option<&str>) -> Result<Vec<f32>, ProviderError> {
        ensure_not_blank(text)?;
        let model = resolve_model(model, &self.embedding_model);
        tracing::debug!(url = %self.embed_url, model, bytes = text.len(), "requesting embedding");

        let request = EmbedRequest { model, input: text };
        let response: EmbedResponse = self
            .post_json("embed", &self.embed_url, &request)
            .await
            .inspect_err(|err| {
                tracing::error!(
                    error = %err,
                    cause = err.source().map(tracing::field::display),
                    model,
                    "embedding request failed"
                )
            })?;

        let vector = response
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::malformed("embed", "response contained no embeddings"))?;

        if vector.len() != self.dimension {
            tracing::error!(
                expected = self.dimension,
                actual = vector.len(),
                model,
                "embedding dimension mismatch"
            );
            return Err(ProviderError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }

        Ok(vector)
    }

    async fn generate(&self, prompt: &str, model: Option<&str>) -> Result<String, ProviderError> {
        let model = resolve_model(model, &self.generation_model);
        tracing::debug!(url = %self.generate_url, model, bytes = prompt.len(), "requesting generation");

        let request = GenerateRequest {
            model,
            prompt,
            stream: false,
        };
        let response: GenerateResponse = self
            .post_json("generate", &self.generate_url, &request)
            .await
            .inspect_err(|err| {
                tracing::error!(
                    error = %err,
                    cause = err.source().map(tracing::field::display),
                    model,
                    "generation request failed"
                )
            })?;

        Ok(response.response)
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

fn join(base: &Url, path: &str) -> Result<Url, ProviderError> {
    base.join(path)
        .map_err(|e| ProviderError::InvalidConfig(format!("cannot build {path} url: {e}")))
}
