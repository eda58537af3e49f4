//! MongoDB client and document store
//!
//! Firestore-style paths are mapped onto MongoDB collections:
//!
//! - `collection/id` is the document with `_id == id` in `collection`
//! - the sub-collection `parent/id/sub` is the collection `parent_sub`,
//!   filtered on `parent_id == id`

use bson::{doc, oid::ObjectId, Bson, Document};
use futures::TryStreamExt;
use mongodb::{options::IndexOptions, Client, IndexModel};
use tracing::{debug, info};

use crate::db::schemas::{RankingDoc, ShardRecord};
use crate::db::store::{DocumentPath, DocumentStore, StoreLayout};
use crate::types::{RankingError, Result};

/// Field linking a sub-collection document to its parent document id
pub const PARENT_ID_FIELD: &str = "parent_id";

/// Trait for schemas that provide index definitions
pub trait IntoIndexes {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)>;
}

/// MongoDB client wrapper
#[derive(Clone)]
pub struct MongoClient {
    client: Client,
    db_name: String,
}

impl MongoClient {
    /// Connect and verify the server answers a ping
    pub async fn new(uri: &str, db_name: &str) -> Result<Self> {
        info!("Connecting to MongoDB at {}", uri);

        // Fail fast instead of hanging on an unreachable server
        let timeout_uri = if uri.contains('?') {
            format!("{}&serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        } else {
            format!("{}?serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        };

        let client = Client::with_uri_str(&timeout_uri)
            .await
            .map_err(|e| RankingError::Database(format!("Failed to connect to MongoDB: {}", e)))?;

        client
            .database(db_name)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| RankingError::Database(format!("MongoDB ping failed: {}", e)))?;

        info!("Connected to MongoDB database '{}'", db_name);

        Ok(Self {
            client,
            db_name: db_name.to_string(),
        })
    }

    fn collection(&self, name: &str) -> mongodb::Collection<Document> {
        self.client.database(&self.db_name).collection(name)
    }
}

/// Collection backing the sub-collection `parent/*/subcollection`
pub fn subcollection_name(parent_collection: &str, subcollection: &str) -> String {
    format!("{}_{}", parent_collection, subcollection)
}

/// Wrap every payload value in `$literal` so a pipeline update stores it verbatim
fn literal_fields(payload: Document) -> Document {
    payload
        .into_iter()
        .map(|(key, value)| (key, Bson::Document(doc! { "$literal": value })))
        .collect()
}

fn insert_failed(collection: &str, e: mongodb::error::Error) -> RankingError {
    RankingError::Database(format!("Insert into {} failed: {}", collection, e))
}

/// Document store backed by MongoDB
#[derive(Clone)]
pub struct MongoStore {
    client: MongoClient,
}

impl MongoStore {
    /// Wrap a connected client and apply schema indexes for `layout`
    pub async fn new(client: MongoClient, layout: &StoreLayout) -> Result<Self> {
        let store = Self { client };
        store
            .apply_indexes::<ShardRecord>(&subcollection_name(
                &layout.ratings_collection,
                &layout.shards_subcollection,
            ))
            .await?;
        store
            .apply_indexes::<RankingDoc>(&layout.ranking_collection)
            .await?;
        Ok(store)
    }

    async fn apply_indexes<T: IntoIndexes>(&self, collection: &str) -> Result<()> {
        let indices: Vec<IndexModel> = T::into_indices()
            .into_iter()
            .map(|(keys, opts)| IndexModel::builder().keys(keys).options(opts).build())
            .collect();

        if indices.is_empty() {
            return Ok(());
        }

        self.client
            .collection(collection)
            .create_indexes(indices)
            .await
            .map_err(|e| RankingError::Database(format!("Failed to create indexes: {}", e)))?;

        debug!(collection, "Indexes applied");
        Ok(())
    }
}

#[async_trait::async_trait]
impl DocumentStore for MongoStore {
    fn kind(&self) -> &'static str {
        "mongodb"
    }

    async fn get_document(&self, path: &DocumentPath) -> Result<Option<Document>> {
        self.client
            .collection(&path.collection)
            .find_one(doc! { "_id": path.id.as_str() })
            .await
            .map_err(|e| RankingError::Database(format!("Find {} failed: {}", path, e)))
    }

    async fn list_subcollection(
        &self,
        parent: &DocumentPath,
        subcollection: &str,
    ) -> Result<Vec<Document>> {
        let name = subcollection_name(&parent.collection, subcollection);

        let mut filter = Document::new();
        filter.insert(PARENT_ID_FIELD, parent.id.as_str());

        let shards = parent.child(subcollection);

        let cursor = self
            .client
            .collection(&name)
            .find(filter)
            .await
            .map_err(|e| RankingError::Database(format!("List {} failed: {}", shards, e)))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| RankingError::Database(format!("Read {} failed: {}", shards, e)))
    }

    async fn count_collection(&self, collection: &str) -> Result<u64> {
        self.client
            .collection(collection)
            .count_documents(doc! {})
            .await
            .map_err(|e| RankingError::Database(format!("Count {} failed: {}", collection, e)))
    }

    async fn create_document(
        &self,
        collection: &str,
        payload: Document,
        timestamp_field: Option<&str>,
    ) -> Result<String> {
        let id = ObjectId::new();
        let target = self.client.collection(collection);

        match timestamp_field {
            Some(field) => {
                // Upsert through a pipeline so the server clock fills the timestamp
                let mut set = literal_fields(payload);
                set.insert(field, "$$NOW");

                target
                    .update_one(doc! { "_id": id }, vec![doc! { "$set": set }])
                    .upsert(true)
                    .await
                    .map_err(|e| insert_failed(collection, e))?;
            }
            None => {
                let mut payload = payload;
                payload.insert("_id", id);

                target
                    .insert_one(payload)
                    .await
                    .map_err(|e| insert_failed(collection, e))?;
            }
        }

        Ok(id.to_hex())
    }
}
