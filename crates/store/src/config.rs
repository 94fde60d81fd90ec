use serde::{Deserialize, Serialize};

use crate::StoreError;

/// Which [`VectorStore`](crate::VectorStore) implementation to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// PostgreSQL with the pgvector extension.
    #[default]
    Postgres,
    /// Process-local store, empty at startup.
    Memory,
}

/// Store configuration, resolved once at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// PostgreSQL connection string. Required for [`StoreBackend::Postgres`].
    pub database_url: Option<String>,
    /// Dimension of every stored embedding.
    pub vector_dimension: usize,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    /// Document table name. Plain SQL identifier, optionally schema-qualified.
    pub table: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Postgres,
            database_url: None,
            vector_dimension: 768,
            max_connections: 10,
            acquire_timeout_secs: 5,
            table: "documents".into(),
        }
    }
}

impl StoreConfig {
    /// In-memory store of the given dimension.
    pub fn in_memory(vector_dimension: usize) -> Self {
        Self {
            backend: StoreBackend::Memory,
            vector_dimension,
            ..Default::default()
        }
    }

    /// PostgreSQL store at `database_url` with default pool settings.
    pub fn postgres(database_url: impl Into<String>) -> Self {
        Self {
            database_url: Some(database_url.into()),
            ..Default::default()
        }
    }

    /// Connection string with surrounding whitespace removed, if one is set.
    pub fn connection_target(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        if self.vector_dimension == 0 {
            return Err(StoreError::InvalidConfig(
                "vector_dimension must be at least 1".into(),
            ));
        }
        if self.backend == StoreBackend::Postgres {
            if self.connection_target().is_none() {
                return Err(StoreError::MissingConnectionTarget);
            }
            if self.max_connections == 0 {
                return Err(StoreError::InvalidConfig(
                    "max_connections must be at least 1".into(),
                ));
            }
            if !is_table_name(&self.table) {
                return Err(StoreError::InvalidConfig(format!(
                    "table {:?} is not a plain SQL identifier",
                    self.table
                )));
            }
        }
        Ok(())
    }
}

/// `ident` or `schema.ident`, each part `[A-Za-z_][A-Za-z0-9_]*`.
/// The table name is interpolated into SQL, so nothing else is accepted.
fn is_table_name(name: &str) -> bool {
    let parts: Vec<&str> = name.split('.').collect();
    parts.len() <= 2
        && parts.iter().all(|part| {
            let mut chars = part.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documents_schema() {
        let cfg = StoreConfig::default();
        assert_eq!(cfg.backend, StoreBackend::Postgres);
        assert_eq!(cfg.vector_dimension, 768);
        assert_eq!(cfg.table, "documents");
        assert!(cfg.database_url.is_none());
    }

    #[test]
    fn postgres_without_url_is_missing_target() {
        for url in [None, Some(String::new()), Some("   ".to_string())] {
            let cfg = StoreConfig {
                database_url: url,
                ..Default::default()
            };
            assert!(matches!(
                cfg.validate(),
                Err(StoreError::MissingConnectionTarget)
            ));
        }
    }

    #[test]
    fn memory_backend_needs_no_url() {
        assert!(StoreConfig::in_memory(3).validate().is_ok());
        assert!(matches!(
            StoreConfig::in_memory(0).validate(),
            Err(StoreError::InvalidConfig(_))
        ));
    }

    #[test]
    fn table_names_are_restricted() {
        assert!(is_table_name("documents"));
        assert!(is_table_name("rag.documents"));
        assert!(is_table_name("_docs2"));
        assert!(!is_table_name(""));
        assert!(!is_table_name("2docs"));
        assert!(!is_table_name("docs; DROP TABLE users"));
        assert!(!is_table_name("a.b.c"));

        let cfg = StoreConfig {
            table: "docs--".into(),
            ..StoreConfig::postgres("postgres://localhost/rag")
        };
        assert!(matches!(cfg.validate(), Err(StoreError::InvalidConfig(_))));
    }

    #[test]
    fn deserializes_partial_yaml_like_json() {
        let cfg: StoreConfig =
            serde_json::from_str(r#"{"backend":"memory","vector_dimension":4}"#).unwrap();
        assert_eq!(cfg.backend, StoreBackend::Memory);
        assert_eq!(cfg.vector_dimension, 4);
        assert_eq!(cfg.max_connections, 10);
    }
}
