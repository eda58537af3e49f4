//! In-memory document store
//!
//! Backs development mode when MongoDB is unreachable, and serves as the
//! base for test doubles.

use bson::{oid::ObjectId, DateTime, Document};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::db::store::{DocumentPath, DocumentStore};
use crate::types::Result;

/// Collection name -> document id -> document
type Collections = HashMap<String, BTreeMap<String, Document>>;

/// Simple in-memory document store
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<Collections>>,
    /// Sub-collection path (`coll/id/sub`) -> documents
    subcollections: Arc<RwLock<HashMap<String, Vec<Document>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a document at an explicit path, replacing any previous one
    pub async fn put_document(&self, path: &DocumentPath, doc: Document) {
        self.collections
            .write()
            .await
            .entry(path.collection.clone())
            .or_default()
            .insert(path.id.clone(), doc);
    }

    /// Append a document to the sub-collection under `parent`
    pub async fn add_subdocument(&self, parent: &DocumentPath, subcollection: &str, doc: Document) {
        self.subcollections
            .write()
            .await
            .entry(parent.child(subcollection))
            .or_default()
            .push(doc);
    }

    /// Snapshot of every document in a collection, ordered by id
    pub async fn documents(&self, collection: &str) -> Vec<(String, Document)> {
        self.collections
            .read()
            .await
            .get(collection)
            .map(|docs| docs.iter().map(|(id, d)| (id.clone(), d.clone())).collect())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    fn kind(&self) -> &'static str {
        "memory"
    }

    async fn get_document(&self, path: &DocumentPath) -> Result<Option<Document>> {
        Ok(self
            .collections
            .read()
            .await
            .get(&path.collection)
            .and_then(|docs| docs.get(&path.id))
            .cloned())
    }

    async fn list_subcollection(
        &self,
        parent: &DocumentPath,
        subcollection: &str,
    ) -> Result<Vec<Document>> {
        Ok(self
            .subcollections
            .read()
            .await
            .get(&parent.child(subcollection))
            .cloned()
            .unwrap_or_default())
    }

    async fn count_collection(&self, collection: &str) -> Result<u64> {
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .map_or(0, |docs| docs.len() as u64))
    }

    async fn create_document(
        &self,
        collection: &str,
        mut payload: Document,
        timestamp_field: Option<&str>,
    ) -> Result<String> {
        let id = ObjectId::new().to_hex();
        if let Some(field) = timestamp_field {
            payload.insert(field, DateTime::now());
        }

        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), payload);

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_get_missing_document() {
        let store = MemoryStore::new();
        let found = tokio_test::block_on(store.get_document(&DocumentPath::new("develop", "x")));
        assert!(found.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_subcollections_are_isolated_per_parent() {
        let store = MemoryStore::new();
        let a = DocumentPath::new("ratings", "0000");
        let b = DocumentPath::new("ratings", "0001");

        store.add_subdocument(&a, "shards", doc! { "count": 1 }).await;
        store.add_subdocument(&a, "shards", doc! { "count": 2 }).await;
        store.add_subdocument(&b, "shards", doc! { "count": 9 }).await;

        assert_eq!(store.list_subcollection(&a, "shards").await.unwrap().len(), 2);
        assert_eq!(store.list_subcollection(&b, "shards").await.unwrap().len(), 1);
        assert!(store.list_subcollection(&a, "other").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_count_only_sees_top_level_documents() {
        let store = MemoryStore::new();
        let parent = DocumentPath::new("ratings", "0000");
        store.put_document(&parent, doc! {}).await;
        store.add_subdocument(&parent, "shards", doc! { "count": 1 }).await;

        assert_eq!(store.count_collection("ratings").await.unwrap(), 1);
        assert_eq!(store.count_collection("missing").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_document_assigns_fresh_ids_and_stamp() {
        let store = MemoryStore::new();
        let first = store
            .create_document("ranking", doc! { "ranking": [] }, Some("createdAt"))
            .await
            .unwrap();
        let second = store
            .create_document("ranking", doc! { "ranking": [] }, None)
            .await
            .unwrap();

        assert_ne!(first, second);
        let docs = store.documents("ranking").await;
        assert_eq!(docs.len(), 2);

        let stamped = docs.iter().find(|(id, _)| *id == first).unwrap();
        assert!(stamped.1.get_datetime("createdAt").is_ok());
        let plain = docs.iter().find(|(id, _)| *id == second).unwrap();
        assert!(!plain.1.contains_key("createdAt"));
    }
}
