use thiserror::Error;

/// Errors surfaced by [`VectorStore`](crate::VectorStore) implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The PostgreSQL backend was selected without a connection string.
    #[error("no database connection target configured")]
    MissingConnectionTarget,
    #[error("invalid store config: {0}")]
    InvalidConfig(String),
    /// `top_k` must be at least 1.
    #[error("top_k must be at least 1")]
    InvalidTopK,
    /// A vector does not have the store's configured dimension.
    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    /// Connectivity or query failure reported by the database driver.
    #[error("database error")]
    Database(#[from] sqlx::Error),
    /// Non-driver backend failure (poisoned lock, injected fault).
    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        StoreError::Backend(err.to_string())
    }

    /// True for failures of the store itself rather than of the caller's
    /// arguments or the deployment's configuration.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            StoreError::Database(_) | StoreError::Backend(_) | StoreError::DimensionMismatch { .. }
        )
    }

    /// True when the failure is a configuration problem detected at construction.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            StoreError::MissingConnectionTarget | StoreError::InvalidConfig(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_variants() {
        assert!(StoreError::MissingConnectionTarget.is_configuration());
        assert!(!StoreError::MissingConnectionTarget.is_upstream());
        assert!(!StoreError::InvalidTopK.is_configuration());
        assert!(!StoreError::InvalidTopK.is_upstream());
        assert!(StoreError::backend("poisoned lock").is_upstream());
        assert!(StoreError::Database(sqlx::Error::PoolTimedOut).is_upstream());
    }

    #[test]
    fn database_error_keeps_source() {
        use std::error::Error as _;
        let err = StoreError::from(sqlx::Error::PoolTimedOut);
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "database error");
    }
}
