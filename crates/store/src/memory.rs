use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use crate::distance::cosine_distance;
use crate::types::{Document, DocumentStats, NewDocument, SearchResult};
use crate::{ensure_top_k, StoreError, VectorStore};

struct Inner {
    documents: Vec<Document>,
    next_id: i64,
}

/// Process-local [`VectorStore`] with exact (brute-force) cosine search.
///
/// Ids are assigned on insert starting at 1. Results are ordered by distance,
/// ties broken by ascending id.
pub struct InMemoryStore {
    dimension: usize,
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            inner: RwLock::new(Inner {
                documents: Vec::new(),
                next_id: 1,
            }),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Store `document` and return its assigned id.
    ///
    /// The embedding must have exactly [`dimension`](Self::dimension) entries.
    pub fn insert(&self, document: NewDocument) -> Result<i64, StoreError> {
        self.check_dimension(&document.embedding)?;
        let mut guard = self
            .inner
            .write()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        let id = guard.next_id;
        guard.next_id += 1;
        guard.documents.push(Document {
            id,
            content: document.content,
            content_type: document.content_type,
            metadata: document.metadata,
            embedding: document.embedding,
            created_at: document.created_at.unwrap_or_else(Utc::now),
        });
        Ok(id)
    }

    /// Insert several documents under a single write lock. Either all are
    /// stored or, on a dimension mismatch, none are.
    pub fn insert_batch(&self, documents: Vec<NewDocument>) -> Result<Vec<i64>, StoreError> {
        for document in &documents {
            self.check_dimension(&document.embedding)?;
        }
        let mut guard = self
            .inner
            .write()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        let now = Utc::now();
        let mut ids = Vec::with_capacity(documents.len());
        for document in documents {
            let id = guard.next_id;
            guard.next_id += 1;
            guard.documents.push(Document {
                id,
                content: document.content,
                content_type: document.content_type,
                metadata: document.metadata,
                embedding: document.embedding,
                created_at: document.created_at.unwrap_or(now),
            });
            ids.push(id);
        }
        Ok(ids)
    }

    pub fn get(&self, id: i64) -> Result<Option<Document>, StoreError> {
        let guard = self
            .inner
            .read()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        Ok(guard.documents.iter().find(|d| d.id == id).cloned())
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        let guard = self
            .inner
            .read()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        Ok(guard.documents.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<(), StoreError> {
        if vector.len() != self.dimension {
            return Err(StoreError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl VectorStore for InMemoryStore {
    async fn search(
        &self,
        query: &[f32],
        top_k: usize,
        content_type: Option<&str>,
    ) -> Result<Vec<SearchResult>, StoreError> {
        ensure_top_k(top_k)?;
        self.check_dimension(query)?;

        let guard = self
            .inner
            .read()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        let mut scored: Vec<(f32, &Document)> = guard
            .documents
            .iter()
            .filter(|doc| content_type.is_none_or(|tag| doc.content_type == tag))
            .map(|doc| (cosine_distance(query, &doc.embedding), doc))
            .collect();
        scored.sort_by(|(da, a), (db, b)| da.total_cmp(db).then_with(|| a.id.cmp(&b.id)));
        scored.truncate(top_k);

        let results: Vec<SearchResult> = scored
            .into_iter()
            .map(|(distance, doc)| SearchResult {
                id: doc.id,
                content: doc.content.clone(),
                metadata: doc.metadata.to_string(),
                content_type: doc.content_type.clone(),
                distance,
            })
            .collect();
        tracing::debug!(top_k, ?content_type, hits = results.len(), "in-memory search");
        Ok(results)
    }

    async fn get_stats(&self) -> Result<DocumentStats, StoreError> {
        let guard = self
            .inner
            .read()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        if guard.documents.is_empty() {
            return Ok(DocumentStats::empty());
        }

        let mut counts: HashMap<&str, u64> = HashMap::new();
        for doc in &guard.documents {
            *counts.entry(doc.content_type.as_str()).or_default() += 1;
        }
        let counts = counts
            .into_iter()
            .map(|(tag, count)| (tag.to_string(), count))
            .collect();

        let mut stats = DocumentStats::empty();
        stats.total_documents = guard.documents.len() as u64;
        stats.documents_by_type = DocumentStats::order_counts(counts);
        if let Some(oldest) = guard.documents.iter().map(|d| d.created_at).min() {
            stats.oldest_document = oldest;
        }
        if let Some(latest) = guard.documents.iter().map(|d| d.created_at).max() {
            stats.latest_document = latest;
        }
        Ok(stats)
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let mut guard = self
            .inner
            .write()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        let before = guard.documents.len();
        guard.documents.retain(|doc| doc.id != id);
        Ok(guard.documents.len() != before)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
