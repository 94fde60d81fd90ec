use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Seconds from the Unix epoch to `0001-01-01T00:00:00Z`.
const SENTINEL_UNIX_SECS: i64 = -62_135_596_800;

/// Timestamp reported for the oldest and latest document of an empty store.
pub fn sentinel_timestamp() -> DateTime<Utc> {
    DateTime::from_timestamp(SENTINEL_UNIX_SECS, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// One retrieved passage with its distance to the query vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub id: i64,
    pub content: String,
    /// Document attributes as opaque JSON text.
    pub metadata: String,
    pub content_type: String,
    /// Cosine distance; smaller is more similar.
    pub distance: f32,
}

/// Aggregate statistics over the whole store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentStats {
    pub total_documents: u64,
    /// Counts per content type, largest first, ties by tag.
    pub documents_by_type: IndexMap<String, u64>,
    pub latest_document: DateTime<Utc>,
    pub oldest_document: DateTime<Utc>,
}

impl DocumentStats {
    /// Stats of a store holding no documents.
    pub fn empty() -> Self {
        Self {
            total_documents: 0,
            documents_by_type: IndexMap::new(),
            latest_document: sentinel_timestamp(),
            oldest_document: sentinel_timestamp(),
        }
    }

    /// Builds the per-type map in reporting order from unordered counts.
    pub(crate) fn order_counts(mut counts: Vec<(String, u64)>) -> IndexMap<String, u64> {
        counts.sort_by(|(tag_a, count_a), (tag_b, count_b)| {
            count_b.cmp(count_a).then_with(|| tag_a.cmp(tag_b))
        });
        counts.into_iter().collect()
    }
}

/// A persisted document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: i64,
    pub content: String,
    pub content_type: String,
    pub metadata: serde_json::Value,
    pub embedding: Vec<f32>,
    pub created_at: DateTime<Utc>,
}

/// A document to insert into a store that assigns ids itself.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDocument {
    pub content: String,
    pub content_type: String,
    pub metadata: serde_json::Value,
    pub embedding: Vec<f32>,
    /// Creation time; `None` stamps the current time.
    pub created_at: Option<DateTime<Utc>>,
}

impl NewDocument {
    pub fn new(
        content: impl Into<String>,
        content_type: impl Into<String>,
        embedding: Vec<f32>,
    ) -> Self {
        Self {
            content: content.into(),
            content_type: content_type.into(),
            metadata: serde_json::Value::Object(Default::default()),
            embedding,
            created_at: None,
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sentinel_is_year_one() {
        assert_eq!(sentinel_timestamp().to_rfc3339(), "0001-01-01T00:00:00+00:00");
    }

    #[test]
    fn search_result_serializes_camel_case() {
        let result = SearchResult {
            id: 7,
            content: "Chlorophyll absorbs light.".into(),
            metadata: "{}".into(),
            content_type: "text".into(),
            distance: 0.25,
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 7,
                "content": "Chlorophyll absorbs light.",
                "metadata": "{}",
                "contentType": "text",
                "distance": 0.25
            })
        );
    }

    #[test]
    fn empty_stats_serialize_snake_case_with_sentinels() {
        let value = serde_json::to_value(DocumentStats::empty()).unwrap();
        assert_eq!(value["total_documents"], json!(0));
        assert_eq!(value["documents_by_type"], json!({}));
        assert_eq!(value["oldest_document"], json!("0001-01-01T00:00:00Z"));
        assert_eq!(value["latest_document"], json!("0001-01-01T00:00:00Z"));
    }

    #[test]
    fn counts_are_ordered_by_count_then_tag() {
        let ordered = DocumentStats::order_counts(vec![
            ("text".into(), 2),
            ("audio".into(), 5),
            ("image".into(), 2),
        ]);
        let keys: Vec<_> = ordered.keys().cloned().collect();
        assert_eq!(keys, vec!["audio", "image", "text"]);
    }
}
