//! Shared fixtures and store doubles for integration tests

#![allow(dead_code)]

use bson::{doc, Document};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ranking_aggregator::db::{DocumentPath, DocumentStore, MemoryStore, StoreLayout};
use ranking_aggregator::types::{RankingError, Result};

/// Entity list with Alice (`0000`, shards 3 + 2) and Bob (`0001`, no shards)
pub async fn alice_and_bob() -> MemoryStore {
    let layout = StoreLayout::default();
    let store = MemoryStore::new();

    store
        .put_document(
            &layout.source_path(),
            doc! {
                "characters": [
                    { "id": "0000", "name": "Alice", "url": "https://example.com/alice" },
                    { "id": "0001", "name": "Bob", "url": "https://example.com/bob" },
                ]
            },
        )
        .await;

    for count in [3, 2] {
        store
            .add_subdocument(
                &layout.rating_path("0000"),
                &layout.shards_subcollection,
                doc! { "count": count },
            )
            .await;
    }

    store
}

/// Wraps a store and counts every call
#[derive(Default)]
pub struct CountingStore {
    pub inner: MemoryStore,
    pub reads: AtomicUsize,
    pub writes: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: MemoryStore) -> Arc<Self> {
        Arc::new(Self {
            inner,
            ..Default::default()
        })
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl DocumentStore for CountingStore {
    fn kind(&self) -> &'static str {
        "counting"
    }

    async fn get_document(&self, path: &DocumentPath) -> Result<Option<Document>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.get_document(path).await
    }

    async fn list_subcollection(
        &self,
        parent: &DocumentPath,
        subcollection: &str,
    ) -> Result<Vec<Document>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.list_subcollection(parent, subcollection).await
    }

    async fn count_collection(&self, collection: &str) -> Result<u64> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.count_collection(collection).await
    }

    async fn create_document(
        &self,
        collection: &str,
        payload: Document,
        timestamp_field: Option<&str>,
    ) -> Result<String> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner
            .create_document(collection, payload, timestamp_field)
            .await
    }
}

/// Fails shard reads for one entity id, optionally delays the others
pub struct FaultyStore {
    pub inner: MemoryStore,
    pub failing_id: String,
    pub delay: Option<Duration>,
}

impl FaultyStore {
    pub fn new(inner: MemoryStore, failing_id: &str) -> Arc<Self> {
        Arc::new(Self {
            inner,
            failing_id: failing_id.to_string(),
            delay: None,
        })
    }

    /// Stalls every shard read by `delay`
    pub fn slow(inner: MemoryStore, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            inner,
            failing_id: String::new(),
            delay: Some(delay),
        })
    }
}

#[async_trait::async_trait]
impl DocumentStore for FaultyStore {
    fn kind(&self) -> &'static str {
        "faulty"
    }

    async fn get_document(&self, path: &DocumentPath) -> Result<Option<Document>> {
        self.inner.get_document(path).await
    }

    async fn list_subcollection(
        &self,
        parent: &DocumentPath,
        subcollection: &str,
    ) -> Result<Vec<Document>> {
        if parent.id == self.failing_id {
            return Err(RankingError::Database(format!(
                "simulated fault reading {}",
                parent.child(subcollection)
            )));
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.inner.list_subcollection(parent, subcollection).await
    }

    async fn count_collection(&self, collection: &str) -> Result<u64> {
        self.inner.count_collection(collection).await
    }

    async fn create_document(
        &self,
        collection: &str,
        payload: Document,
        timestamp_field: Option<&str>,
    ) -> Result<String> {
        self.inner
            .create_document(collection, payload, timestamp_field)
            .await
    }
}

/// Reverses completion order: lower indices finish last
pub struct StaggeredStore {
    pub inner: MemoryStore,
    pub n: u64,
}

#[async_trait::async_trait]
impl DocumentStore for StaggeredStore {
    fn kind(&self) -> &'static str {
        "staggered"
    }

    async fn get_document(&self, path: &DocumentPath) -> Result<Option<Document>> {
        self.inner.get_document(path).await
    }

    async fn list_subcollection(
        &self,
        parent: &DocumentPath,
        subcollection: &str,
    ) -> Result<Vec<Document>> {
        let index: u64 = parent.id.parse().unwrap_or(0);
        let wait = self.n.saturating_sub(index) * 5;
        tokio::time::sleep(Duration::from_millis(wait)).await;
        self.inner.list_subcollection(parent, subcollection).await
    }

    async fn count_collection(&self, collection: &str) -> Result<u64> {
        self.inner.count_collection(collection).await
    }

    async fn create_document(
        &self,
        collection: &str,
        payload: Document,
        timestamp_field: Option<&str>,
    ) -> Result<String> {
        self.inner
            .create_document(collection, payload, timestamp_field)
            .await
    }
}
