//! mmrag vector store
//!
//! Documents with fixed-dimension embeddings, queried by cosine distance.
//! [`VectorStore`] is the contract the query pipeline relies on; the actual
//! nearest-neighbour machinery belongs to the backend.
//!
//! - [`PgVectorStore`]: PostgreSQL + pgvector, `<=>` cosine distance.
//! - [`InMemoryStore`]: exact brute-force search, for tests and local runs.
//!
//! ```
//! use store::{InMemoryStore, NewDocument, VectorStore};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), store::StoreError> {
//! let store = InMemoryStore::new(3);
//! store.insert(NewDocument::new("Plants convert light to energy.", "text", vec![1.0, 0.0, 0.0]))?;
//! let hits = store.search(&[1.0, 0.1, 0.0], 5, None).await?;
//! assert_eq!(hits.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod types;

mod distance;
mod memory;
mod postgres;

pub use crate::config::{StoreBackend, StoreConfig};
pub use crate::error::StoreError;
pub use crate::memory::InMemoryStore;
pub use crate::postgres::PgVectorStore;
pub use crate::types::{sentinel_timestamp, Document, DocumentStats, NewDocument, SearchResult};

use std::sync::Arc;

use async_trait::async_trait;

/// Nearest-neighbour document retrieval plus aggregate statistics.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// At most `top_k` documents ordered by ascending cosine distance to
    /// `query`, restricted to `content_type` when given. No matches is an
    /// empty vector, not an error. `top_k == 0` fails with
    /// [`StoreError::InvalidTopK`].
    async fn search(
        &self,
        query: &[f32],
        top_k: usize,
        content_type: Option<&str>,
    ) -> Result<Vec<SearchResult>, StoreError>;

    /// Totals, per-type counts and creation-time bounds.
    async fn get_stats(&self) -> Result<DocumentStats, StoreError>;

    /// Remove one document. Returns whether it existed.
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;

    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;
}

/// Build the store selected by `cfg.backend`.
pub fn build_store(cfg: &StoreConfig) -> Result<Arc<dyn VectorStore>, StoreError> {
    cfg.validate()?;
    match cfg.backend {
        StoreBackend::Postgres => Ok(Arc::new(PgVectorStore::new(cfg)?)),
        StoreBackend::Memory => Ok(Arc::new(InMemoryStore::new(cfg.vector_dimension))),
    }
}

pub(crate) fn ensure_top_k(top_k: usize) -> Result<(), StoreError> {
    if top_k == 0 {
        return Err(StoreError::InvalidTopK);
    }
    Ok(())
}
