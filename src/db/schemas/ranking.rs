//! Persisted ranking snapshot schema
//!
//! Every run inserts a new `{ ranking: [...], createdAt? }` document; earlier
//! snapshots are never overwritten.

use bson::Document;
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::IntoIndexes;
use crate::ranking::RatingEntry;
use crate::types::{RankingError, Result};

/// Server-assigned creation timestamp field
pub const CREATED_AT_FIELD: &str = "createdAt";

/// Ranking document stored in the ranking collection
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct RankingDoc {
    pub ranking: Vec<RatingEntry>,
}

impl RankingDoc {
    /// Encode as a BSON payload (the timestamp is added by the store)
    pub fn to_payload(&self) -> Result<Document> {
        bson::to_document(self)
            .map_err(|e| RankingError::Database(format!("Failed to encode ranking: {}", e)))
    }
}

impl IntoIndexes for RankingDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        let mut keys = Document::new();
        keys.insert(CREATED_AT_FIELD, -1);

        vec![(
            keys,
            Some(
                IndexOptions::builder()
                    .name("created_at_desc".to_string())
                    .build(),
            ),
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shape() {
        let doc = RankingDoc {
            ranking: vec![RatingEntry {
                id: "0000".to_string(),
                name: "Alice".to_string(),
                rating: 5,
            }],
        };

        let payload = doc.to_payload().unwrap();
        let entries = payload.get_array("ranking").unwrap();
        assert_eq!(entries.len(), 1);

        let first = entries[0].as_document().unwrap();
        assert_eq!(first.get_str("id").unwrap(), "0000");
        assert_eq!(first.get_str("name").unwrap(), "Alice");
        assert_eq!(first.get_i64("rating").unwrap(), 5);
        assert!(!payload.contains_key(CREATED_AT_FIELD));
    }
}
