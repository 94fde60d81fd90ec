use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::ProviderError;

/// Which [`EmbeddingProvider`](crate::EmbeddingProvider) implementation to build.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderMode {
    /// Remote Ollama-compatible model server.
    #[default]
    Ollama,
    /// Deterministic in-process stub. No network access.
    Stub,
}

/// Runtime configuration for the embedding/generation provider.
///
/// Every field is resolved once when the provider is built; callers that pass
/// `None` as the model on a request get [`embedding_model`](Self::embedding_model)
/// or [`generation_model`](Self::generation_model).
///
/// # Example
/// ```
/// use provider::{ProviderConfig, ProviderMode};
///
/// let cfg = ProviderConfig {
///     mode: ProviderMode::Stub,
///     dimension: 384,
///     ..Default::default()
/// };
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProviderConfig {
    /// Implementation selector.
    pub mode: ProviderMode,
    /// Base URL of the model server, e.g. `http://localhost:11434`.
    pub base_url: String,
    /// Default model for `embed`.
    pub embedding_model: String,
    /// Default model for `generate`.
    pub generation_model: String,
    /// Vision model name. Only reported by the info endpoint.
    pub vision_model: String,
    /// Expected embedding dimension. Responses with another length are rejected.
    pub dimension: usize,
    /// Overall per-request timeout in seconds. Generation on large models is slow.
    pub timeout_secs: u64,
    /// TCP connect timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            mode: ProviderMode::Ollama,
            base_url: "http://localhost:11434".into(),
            embedding_model: "nomic-embed-text".into(),
            generation_model: "qwen2.5:14b".into(),
            vision_model: "qwen2.5-vl:7b".into(),
            dimension: 768,
            timeout_secs: 120,
            connect_timeout_secs: 10,
        }
    }
}

impl ProviderConfig {
    /// Check the configuration without building anything.
    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.embedding_model.trim().is_empty() {
            return Err(ProviderError::InvalidConfig(
                "embedding_model must not be blank".into(),
            ));
        }
        if self.generation_model.trim().is_empty() {
            return Err(ProviderError::InvalidConfig(
                "generation_model must not be blank".into(),
            ));
        }
        if self.dimension == 0 {
            return Err(ProviderError::InvalidConfig(
                "dimension must be >= 1".into(),
            ));
        }
        if self.mode == ProviderMode::Ollama {
            if self.timeout_secs == 0 {
                return Err(ProviderError::InvalidConfig(
                    "timeout_secs must be >= 1".into(),
                ));
            }
            self.parsed_base_url()?;
        }
        Ok(())
    }

    /// Parse [`base_url`](Self::base_url) into a URL that relative endpoint
    /// paths can be joined onto (always ends with `/`).
    pub(crate) fn parsed_base_url(&self) -> Result<Url, ProviderError> {
        let raw = self.base_url.trim();
        if raw.is_empty() {
            return Err(ProviderError::InvalidConfig(
                "base_url must not be blank".into(),
            ));
        }
        let mut url = Url::parse(raw)
            .map_err(|e| ProviderError::InvalidConfig(format!("invalid base_url {raw:?}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ProviderError::InvalidConfig(format!(
                "base_url must use http or https, got {:?}",
                url.scheme()
            )));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let cfg = ProviderConfig::default();
        assert_eq!(cfg.mode, ProviderMode::Ollama);
        assert_eq!(cfg.base_url, "http://localhost:11434");
        assert_eq!(cfg.embedding_model, "nomic-embed-text");
        assert_eq!(cfg.generation_model, "qwen2.5:14b");
        assert_eq!(cfg.dimension, 768);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        let cfg = ProviderConfig {
            base_url: "http://models.internal:11434/ollama".into(),
            ..Default::default()
        };
        let url = cfg.parsed_base_url().unwrap();
        assert_eq!(url.as_str(), "http://models.internal:11434/ollama/");
        assert_eq!(
            url.join("api/embed").unwrap().as_str(),
            "http://models.internal:11434/ollama/api/embed"
        );
    }

    #[test]
    fn rejects_blank_and_non_http_urls() {
        for bad in ["", "   ", "not a url", "ftp://host/"] {
            let cfg = ProviderConfig {
                base_url: bad.into(),
                ..Default::default()
            };
            assert!(
                matches!(cfg.validate(), Err(ProviderError::InvalidConfig(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn stub_mode_ignores_base_url() {
        let cfg = ProviderConfig {
            mode: ProviderMode::Stub,
            base_url: String::new(),
            ..Default::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_zero_dimension_and_blank_models() {
        let cfg = ProviderConfig {
            dimension: 0,
            ..Default::default()
        };
        assert!(cfg.validate().unwrap_err().to_string().contains("dimension"));

        let cfg = ProviderConfig {
            generation_model: " ".into(),
            ..Default::default()
        };
        assert!(cfg
            .validate()
            .unwrap_err()
            .to_string()
            .contains("generation_model"));
    }

    #[test]
    fn config_serde_uses_defaults_for_missing_fields() {
        let cfg: ProviderConfig =
            serde_json::from_str(r#"{"mode":"stub","embedding_model":"bge-m3"}"#).unwrap();
        assert_eq!(cfg.mode, ProviderMode::Stub);
        assert_eq!(cfg.embedding_model, "bge-m3");
        assert_eq!(cfg.generation_model, "qwen2.5:14b");
    }
}
