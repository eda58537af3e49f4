//! Counter shard schema
//!
//! Each entity's vote total is split across many `{ count }` documents to
//! avoid write contention. Only the read side lives here.

use bson::Document;
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, PARENT_ID_FIELD};
use crate::types::{RankingError, Result};

/// One partial counter
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShardRecord {
    /// Non-negative partial count
    pub count: u64,
}

impl ShardRecord {
    /// Validate a raw shard document read from `path`
    pub fn parse(doc: Document, path: &str) -> Result<Self> {
        bson::from_document(doc).map_err(|e| RankingError::malformed(path, e))
    }
}

impl IntoIndexes for ShardRecord {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        let mut keys = Document::new();
        keys.insert(PARENT_ID_FIELD, 1);

        vec![(
            keys,
            Some(
                IndexOptions::builder()
                    .name("parent_id_index".to_string())
                    .build(),
            ),
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_accepts_int32_and_int64_counts() {
        assert_eq!(
            ShardRecord::parse(doc! { "count": 3_i32 }, "s").unwrap().count,
            3
        );
        assert_eq!(
            ShardRecord::parse(doc! { "count": 5_i64, "parent_id": "0000" }, "s")
                .unwrap()
                .count,
            5
        );
    }

    #[test]
    fn test_rejects_negative_count() {
        let err = ShardRecord::parse(doc! { "count": -1 }, "ratings/0000/shards").unwrap_err();
        assert!(matches!(err, RankingError::MalformedRecord { .. }));
    }

    #[test]
    fn test_rejects_missing_or_textual_count() {
        assert!(ShardRecord::parse(doc! {}, "s").is_err());
        assert!(ShardRecord::parse(doc! { "count": "7" }, "s").is_err());
    }

    #[test]
    fn test_indexes_parent_id() {
        let indices = ShardRecord::into_indices();
        assert_eq!(indices.len(), 1);
        assert!(indices[0].0.contains_key(PARENT_ID_FIELD));
    }
}
