use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use pgvector::Vector;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};

use crate::types::{DocumentStats, SearchResult};
use crate::{ensure_top_k, StoreConfig, StoreError, VectorStore};

/// [`VectorStore`] over a PostgreSQL table with a pgvector `embedding` column.
///
/// Expected layout (created out of band):
///
/// ```sql
/// CREATE TABLE documents (
///     id           SERIAL PRIMARY KEY,
///     content      TEXT NOT NULL,
///     metadata     JSONB,
///     content_type VARCHAR(50),
///     embedding    vector(768),
///     created_at   TIMESTAMP DEFAULT CURRENT_TIMESTAMP
/// );
/// CREATE INDEX ON documents USING ivfflat (embedding vector_cosine_ops);
/// ```
///
/// The pool connects lazily, so construction never touches the network.
/// Each operation checks out one connection and returns it on drop.
pub struct PgVectorStore {
    pool: PgPool,
    dimension: usize,
    search_sql: String,
    search_by_type_sql: String,
    count_sql: String,
    by_type_sql: String,
    bounds_sql: String,
    delete_sql: String,
}

#[derive(sqlx::FromRow)]
struct SearchRow {
    id: i64,
    content: String,
    metadata: String,
    content_type: String,
    distance: f64,
}

impl From<SearchRow> for SearchResult {
    fn from(row: SearchRow) -> Self {
        SearchResult {
            id: row.id,
            content: row.content,
            metadata: row.metadata,
            content_type: row.content_type,
            distance: row.distance as f32,
        }
    }
}

impl PgVectorStore {
    /// Validate `cfg` and create a lazily connecting pool.
    ///
    /// Fails with [`StoreError::MissingConnectionTarget`] when no connection
    /// string is configured and [`StoreError::InvalidConfig`] when it does
    /// not parse. Must be called within a Tokio runtime.
    pub fn new(cfg: &StoreConfig) -> Result<Self, StoreError> {
        cfg.validate()?;
        let url = cfg
            .connection_target()
            .ok_or(StoreError::MissingConnectionTarget)?;
        let options = PgConnectOptions::from_str(url)
            .map_err(|e| StoreError::InvalidConfig(format!("unparseable database_url: {e}")))?;

        let pool = PgPoolOptions::new()
            .max_connections(cfg.max_connections)
            .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
            .connect_lazy_with(options);

        tracing::info!(
            table = %cfg.table,
            dimension = cfg.vector_dimension,
            max_connections = cfg.max_connections,
            "postgres vector store configured"
        );
        Ok(Self::with_pool(pool, &cfg.table, cfg.vector_dimension))
    }

    /// Wrap an existing pool. `table` must already be a validated identifier.
    pub fn with_pool(pool: PgPool, table: &str, dimension: usize) -> Self {
        let select = format!(
            "SELECT id::bigint AS id, content, \
             COALESCE(metadata::text, '{{}}') AS metadata, \
             COALESCE(content_type, '') AS content_type, \
             (embedding <=> $1)::float8 AS distance \
             FROM {table}"
        );
        Self {
            pool,
            dimension,
            search_sql: format!("{select} ORDER BY embedding <=> $1 LIMIT $2"),
            search_by_type_sql: format!(
                "{select} WHERE content_type = $3 ORDER BY embedding <=> $1 LIMIT $2"
            ),
            count_sql: format!("SELECT COUNT(*) FROM {table}"),
            by_type_sql: format!(
                "SELECT COALESCE(content_type, '') AS content_type, COUNT(*) AS count \
                 FROM {table} GROUP BY content_type"
            ),
            bounds_sql: format!("SELECT MIN(created_at), MAX(created_at) FROM {table}"),
            delete_sql: format!("DELETE FROM {table} WHERE id = $1"),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

#[async_trait]
impl VectorStore for PgVectorStore {
    async fn search(
        &self,
        query: &[f32],
        top_k: usize,
        content_type: Option<&str>,
    ) -> Result<Vec<SearchResult>, StoreError> {
        ensure_top_k(top_k)?;
        let limit = i64::try_from(top_k).map_err(|_| StoreError::InvalidTopK)?;
        let embedding = Vector::from(query.to_vec());

        let mut conn = self.pool.acquire().await?;
        let rows: Vec<SearchRow> = match content_type {
            Some(tag) => {
                sqlx::query_as(&self.search_by_type_sql)
                    .bind(embedding)
                    .bind(limit)
                    .bind(tag)
                    .fetch_all(&mut *conn)
                    .await?
            }
            None => {
                sqlx::query_as(&self.search_sql)
                    .bind(embedding)
                    .bind(limit)
                    .fetch_all(&mut *conn)
                    .await?
            }
        };
        tracing::debug!(top_k, ?content_type, hits = rows.len(), "pgvector search");
        Ok(rows.into_iter().map(SearchResult::from).collect())
    }

    async fn get_stats(&self) -> Result<DocumentStats, StoreError> {
        let mut conn = self.pool.acquire().await?;

        let total: i64 = sqlx::query_scalar(&self.count_sql)
            .fetch_one(&mut *conn)
            .await?;
        if total == 0 {
            return Ok(DocumentStats::empty());
        }

        let by_type: Vec<(String, i64)> = sqlx::query_as(&self.by_type_sql)
            .fetch_all(&mut *conn)
            .await?;
        let (oldest, latest): (Option<NaiveDateTime>, Option<NaiveDateTime>) =
            sqlx::query_as(&self.bounds_sql)
                .fetch_one(&mut *conn)
                .await?;

        let mut stats = DocumentStats::empty();
        stats.total_documents = total.max(0) as u64;
        stats.documents_by_type = DocumentStats::order_counts(
            by_type
                .into_iter()
                .map(|(tag, count)| (tag, count.max(0) as u64))
                .collect(),
        );
        if let Some(oldest) = oldest {
            stats.oldest_document = oldest.and_utc();
        }
        if let Some(latest) = latest {
            stats.latest_document = latest.and_utc();
        }
        Ok(stats)
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let result = sqlx::query(&self.delete_sql)
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
