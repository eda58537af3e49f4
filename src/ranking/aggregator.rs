//! Shard aggregation
//!
//! For entity indices `0..n`, reads every counter shard of the entity and
//! sums the counts. Reads fan out concurrently up to a fixed bound; results
//! are collected in index order so completion order never leaks into the
//! output. The first failed read aborts the whole aggregation.

use futures::{stream, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::db::schemas::ShardRecord;
use crate::db::{DocumentStore, StoreLayout};
use crate::ranking::NameDictionary;
use crate::types::{RankingError, Result};

/// Width of the zero-padded decimal shard group id.
///
/// The counter write path addresses shards with the same format; both sides
/// must agree on it.
pub const SHARD_ID_WIDTH: usize = 4;

/// One aggregated entity
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RatingEntry {
    pub id: String,
    pub name: String,
    pub rating: u64,
}

/// Shard group id for an entity index (`7` -> `"0007"`).
///
/// Indices wider than [`SHARD_ID_WIDTH`] digits are rendered in full.
pub fn shard_group_id(index: u64) -> String {
    format!("{:0width$}", index, width = SHARD_ID_WIDTH)
}

/// Sum the counts of one entity's shards
pub fn sum_shards(id: &str, shards: &[ShardRecord]) -> Result<u64> {
    shards.iter().try_fold(0u64, |total, shard| {
        total
            .checked_add(shard.count)
            .ok_or_else(|| RankingError::CounterOverflow(id.to_string()))
    })
}

/// Reads shard collections and produces one rating entry per entity index
pub struct ShardAggregator<'a> {
    store: &'a dyn DocumentStore,
    layout: &'a StoreLayout,
    concurrency: usize,
}

impl<'a> ShardAggregator<'a> {
    pub fn new(store: &'a dyn DocumentStore, layout: &'a StoreLayout, concurrency: usize) -> Self {
        Self {
            store,
            layout,
            concurrency: concurrency.max(1),
        }
    }

    /// Aggregate entities `0..n`, returned in index order
    pub async fn aggregate(&self, n: u64, dictionary: &NameDictionary) -> Result<Vec<RatingEntry>> {
        stream::iter(0..n)
            .map(|index| self.aggregate_one(index, dictionary))
            .buffered(self.concurrency)
            .try_collect()
            .await
    }

    async fn aggregate_one(&self, index: u64, dictionary: &NameDictionary) -> Result<RatingEntry> {
        let id = shard_group_id(index);
        let parent = self.layout.rating_path(&id);
        let shard_path = parent.child(&self.layout.shards_subcollection);

        let shards = self
            .store
            .list_subcollection(&parent, &self.layout.shards_subcollection)
            .await?
            .into_iter()
            .map(|doc| ShardRecord::parse(doc, &shard_path))
            .collect::<Result<Vec<_>>>()?;

        let rating = sum_shards(&id, &shards)?;
        debug!(id = %id, shards = shards.len(), rating, "Aggregated shards");

        Ok(RatingEntry {
            name: dictionary.name_for(&id).to_string(),
            id,
            rating,
        })
    }
}
