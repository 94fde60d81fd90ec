use std::error::Error;
use std::fmt;

use provider::ProviderError;
use store::StoreError;

/// Active stage of a query pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    Embedding,
    Retrieving,
    Generating,
}

impl PipelineStage {
    pub fn as_str(self) -> &'static str {
        match self {
            PipelineStage::Embedding => "embedding",
            PipelineStage::Retrieving => "retrieving",
            PipelineStage::Generating => "generating",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse failure class, so callers can branch without inspecting messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Required text was empty or whitespace-only.
    EmptyInput,
    /// An argument was out of range (for example `top_k == 0`).
    InvalidArgument,
    /// Deployment configuration is missing or inconsistent.
    Configuration,
    /// A collaborator (model server, database) failed or misbehaved.
    Upstream,
    /// The run did not finish before its deadline.
    Timeout,
}

impl From<&ProviderError> for ErrorKind {
    fn from(err: &ProviderError) -> Self {
        match err {
            ProviderError::EmptyInput => ErrorKind::EmptyInput,
            err if err.is_upstream() => ErrorKind::Upstream,
            _ => ErrorKind::Configuration,
        }
    }
}

impl From<&StoreError> for ErrorKind {
    fn from(err: &StoreError) -> Self {
        if err.is_configuration() {
            ErrorKind::Configuration
        } else if err.is_upstream() {
            ErrorKind::Upstream
        } else {
            ErrorKind::InvalidArgument
        }
    }
}

/// Errors that terminate a query pipeline run.
///
/// Collaborator failures are wrapped with the stage they happened in. The
/// message names the stage only; the collaborator's error is the
/// [`source`](Error::source).
#[derive(Debug)]
pub enum PipelineError {
    /// The query was empty or whitespace-only. Nothing was dispatched.
    EmptyQuery,
    /// `top_k` was zero. Nothing was dispatched.
    InvalidTopK,
    Embed(ProviderError),
    Retrieve(StoreError),
    Generate(ProviderError),
    DeadlineExceeded { stage: PipelineStage },
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::EmptyQuery => ErrorKind::EmptyInput,
            PipelineError::InvalidTopK => ErrorKind::InvalidArgument,
            PipelineError::Embed(err) | PipelineError::Generate(err) => err.into(),
            PipelineError::Retrieve(err) => err.into(),
            PipelineError::DeadlineExceeded { .. } => ErrorKind::Timeout,
        }
    }

    /// Stage the run was in when it failed; `None` for requests rejected
    /// before the first collaborator call.
    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            PipelineError::EmptyQuery | PipelineError::InvalidTopK => None,
            PipelineError::Embed(_) => Some(PipelineStage::Embedding),
            PipelineError::Retrieve(_) => Some(PipelineStage::Retrieving),
            PipelineError::Generate(_) => Some(PipelineStage::Generating),
            PipelineError::DeadlineExceeded { stage } => Some(*stage),
        }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::EmptyQuery => write!(f, "query is empty"),
            PipelineError::InvalidTopK => write!(f, "top_k must be at least 1"),
            PipelineError::Embed(_) => write!(f, "embedding failed"),
            PipelineError::Retrieve(_) => write!(f, "retrieval failed"),
            PipelineError::Generate(_) => write!(f, "generation failed"),
            PipelineError::DeadlineExceeded { stage } => {
                write!(f, "deadline exceeded while {stage}")
            }
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PipelineError::Embed(err) | PipelineError::Generate(err) => Some(err),
            PipelineError::Retrieve(err) => Some(err),
            PipelineError::EmptyQuery
            | PipelineError::InvalidTopK
            | PipelineError::DeadlineExceeded { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_wrapped_errors() {
        assert_eq!(PipelineError::EmptyQuery.kind(), ErrorKind::EmptyInput);
        assert_eq!(PipelineError::InvalidTopK.kind(), ErrorKind::InvalidArgument);
        assert_eq!(
            PipelineError::Embed(ProviderError::Injected("down".into())).kind(),
            ErrorKind::Upstream
        );
        assert_eq!(
            PipelineError::Retrieve(StoreError::MissingConnectionTarget).kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            PipelineError::Retrieve(StoreError::InvalidTopK).kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            PipelineError::DeadlineExceeded {
                stage: PipelineStage::Generating
            }
            .kind(),
            ErrorKind::Timeout
        );
    }

    #[test]
    fn stage_and_source_are_preserved() {
        let err = PipelineError::Generate(ProviderError::Status {
            operation: "generate",
            status: 502,
            body: "bad gateway".into(),
        });
        assert_eq!(err.stage(), Some(PipelineStage::Generating));
        let source = err.source().map(ToString::to_string).unwrap_or_default();
        assert!(source.contains("HTTP 502"));
        assert_eq!(err.to_string(), "generation failed");

        assert_eq!(PipelineError::EmptyQuery.stage(), None);
        assert!(PipelineError::EmptyQuery.source().is_none());
    }

    #[test]
    fn leaf_classification_matches_error_kind() {
        let provider_cases = [
            (ProviderError::EmptyInput, ErrorKind::EmptyInput),
            (ProviderError::InvalidConfig("blank model".into()), ErrorKind::Configuration),
            (ProviderError::Injected("down".into()), ErrorKind::Upstream),
            (
                ProviderError::DimensionMismatch {
                    expected: 768,
                    actual: 384,
                },
                ErrorKind::Upstream,
            ),
        ];
        for (err, kind) in provider_cases {
            assert_eq!(ErrorKind::from(&err), kind, "{err}");
            assert_eq!(err.is_upstream(), kind == ErrorKind::Upstream, "{err}");
        }

        let store_cases = [
            (StoreError::MissingConnectionTarget, ErrorKind::Configuration),
            (StoreError::InvalidConfig("bad table".into()), ErrorKind::Configuration),
            (StoreError::InvalidTopK, ErrorKind::InvalidArgument),
            (StoreError::backend("poisoned lock"), ErrorKind::Upstream),
            (
                StoreError::DimensionMismatch {
                    expected: 8,
                    actual: 4,
                },
                ErrorKind::Upstream,
            ),
        ];
        for (err, kind) in store_cases {
            assert_eq!(ErrorKind::from(&err), kind, "{err}");
            assert_eq!(err.is_configuration(), kind == ErrorKind::Configuration, "{err}");
            assert_eq!(err.is_upstream(), kind == ErrorKind::Upstream, "{err}");
        }
    }

    #[test]
    fn message_does_not_repeat_the_source() {
        let err = PipelineError::Embed(ProviderError::Injected("model server unreachable".into()));
        assert_eq!(err.to_string(), "embedding failed");
        let source = err.source().map(ToString::to_string).unwrap_or_default();
        assert_eq!(source, "injected failure: model server unreachable");
    }

    #[test]
    fn deadline_message_names_stage() {
        let err = PipelineError::DeadlineExceeded {
            stage: PipelineStage::Retrieving,
        };
        assert_eq!(err.to_string(), "deadline exceeded while retrieving");
    }
}
