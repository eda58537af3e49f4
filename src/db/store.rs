//! Storage boundary consumed by the ranking core
//!
//! The core only needs three read shapes (get-by-path, list a sub-collection,
//! count a collection) and one write shape (create with auto id). Anything
//! that can answer those can back the aggregator.

use bson::Document;
use std::fmt;

use crate::types::Result;

/// Address of a single document: `collection/id`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentPath {
    pub collection: String,
    pub id: String,
}

impl DocumentPath {
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Path of a sub-collection nested under this document
    pub fn child(&self, subcollection: &str) -> String {
        format!("{}/{}/{}", self.collection, self.id, subcollection)
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// Collection names and document ids the pipeline reads from and writes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
    pub source_collection: String,
    pub source_document: String,
    /// Array field of the source document holding entity records
    pub source_field: String,
    pub ratings_collection: String,
    pub shards_subcollection: String,
    pub ranking_collection: String,
}

impl StoreLayout {
    pub fn source_path(&self) -> DocumentPath {
        DocumentPath::new(&self.source_collection, &self.source_document)
    }

    /// Parent document of one entity's shards
    pub fn rating_path(&self, shard_group_id: &str) -> DocumentPath {
        DocumentPath::new(&self.ratings_collection, shard_group_id)
    }
}

impl Default for StoreLayout {
    fn default() -> Self {
        Self {
            source_collection: "develop".to_string(),
            source_document: "ZVP3ieLUu9RTLQN8vkIe".to_string(),
            source_field: "characters".to_string(),
            ratings_collection: "ratings".to_string(),
            shards_subcollection: "shards".to_string(),
            ranking_collection: "ranking".to_string(),
        }
    }
}

/// Document store used by the ranking pipeline (allows test doubles)
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name for health output and logs
    fn kind(&self) -> &'static str;

    /// Fetch one document, `None` when it does not exist
    async fn get_document(&self, path: &DocumentPath) -> Result<Option<Document>>;

    /// Fetch every document of the sub-collection under `parent`, in no particular order
    async fn list_subcollection(
        &self,
        parent: &DocumentPath,
        subcollection: &str,
    ) -> Result<Vec<Document>>;

    /// Number of documents in a top-level collection
    async fn count_collection(&self, collection: &str) -> Result<u64>;

    /// Insert `payload` under a freshly generated id and return that id.
    ///
    /// When `timestamp_field` is set, the store writes its own clock into
    /// that field.
    async fn create_document(
        &self,
        collection: &str,
        payload: Document,
        timestamp_field: Option<&str>,
    ) -> Result<String>;
}
