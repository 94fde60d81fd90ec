use thiserror::Error;

/// Errors surfaced by [`EmbeddingProvider`](crate::EmbeddingProvider) implementations.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Text handed to `embed` was empty or whitespace-only. No request was sent.
    #[error("input text is empty")]
    EmptyInput,
    /// Configuration is inconsistent (bad base URL, blank model name, zero dimension).
    #[error("invalid provider config: {0}")]
    InvalidConfig(String),
    /// The request never produced an HTTP response (DNS, connect, timeout, TLS).
    #[error("{operation} request failed")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },
    /// The provider answered with a non-2xx status.
    #[error("{operation} request returned HTTP {status}: {body}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },
    /// The provider answered 2xx but the body was not what the wire contract promises.
    #[error("{operation} response was malformed: {reason}")]
    MalformedResponse {
        operation: &'static str,
        reason: String,
    },
    /// The returned embedding does not have the configured dimension.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    /// Failure injected by the stub provider.
    #[error("injected failure: {0}")]
    Injected(String),
}

impl ProviderError {
    /// True when the failure originated on the remote side of the call (or in
    /// getting there), as opposed to caller input or local configuration.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            ProviderError::Transport { .. }
                | ProviderError::Status { .. }
                | ProviderError::MalformedResponse { .. }
                | ProviderError::DimensionMismatch { .. }
                | ProviderError::Injected(_)
        )
    }

    pub(crate) fn malformed(operation: &'static str, reason: impl Into<String>) -> Self {
        ProviderError::MalformedResponse {
            operation,
            reason: reason.into(),
        }
    }
}
