//! End-to-end ranking run shared by every trigger
//!
//! load entity list -> dictionary -> resolve N -> aggregate shards -> sort
//! -> persist a new ranking document.
//!
//! Everything before the persist step runs under the invocation deadline.
//! A failure or timeout there leaves the ranking collection untouched.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::schemas::{parse_entity_list, RankingDoc, CREATED_AT_FIELD};
use crate::db::{DocumentStore, StoreLayout};
use crate::ranking::{compose_ranking, NameDictionary, Ranking, ShardAggregator, SortDirection};
use crate::types::{RankingError, Result};

/// Source of the number of ranked entities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityCount {
    /// Known upper bound supplied by configuration
    Fixed(u64),
    /// Count documents in the ratings collection at run time
    Live,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub layout: StoreLayout,
    pub entity_count: EntityCount,
    pub sort_direction: SortDirection,
    pub fetch_concurrency: usize,
    /// Deadline for the read phase
    pub deadline: Duration,
    /// Ask the store to stamp `createdAt` on the ranking document
    pub stamp_created_at: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            layout: StoreLayout::default(),
            entity_count: EntityCount::Fixed(89),
            sort_direction: SortDirection::Desc,
            fetch_concurrency: 8,
            deadline: Duration::from_secs(30),
            stamp_created_at: true,
        }
    }
}

/// Result of a run that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A new ranking document was written
    Persisted { ranking_id: String, entries: usize },
    /// The entity-list document does not exist; nothing was written
    SourceNotFound,
}

/// Whole milliseconds, saturating at `u64::MAX`
fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

pub struct RankingPipeline {
    store: Arc<dyn DocumentStore>,
    config: PipelineConfig,
}

impl RankingPipeline {
    pub fn new(store: Arc<dyn DocumentStore>, config: PipelineConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Run one aggregation and persist its ranking
    pub async fn run(&self) -> Result<Outcome> {
        let invocation = Uuid::new_v4();
        let started = Instant::now();
        info!(%invocation, "Ranking aggregation started");

        let computed = tokio::time::timeout(self.config.deadline, self.compute())
            .await
            .map_err(|_| RankingError::Timeout(millis(self.config.deadline)))?;

        let ranking = match computed? {
            Some(ranking) => ranking,
            None => {
                warn!(
                    %invocation,
                    source = %self.config.layout.source_path(),
                    "Entity list document not found"
                );
                return Ok(Outcome::SourceNotFound);
            }
        };

        let entries = ranking.len();
        let ranking_id = self.persist(ranking).await?;

        info!(
            %invocation,
            ranking_id = %ranking_id,
            entries,
            elapsed_ms = millis(started.elapsed()),
            "Ranking persisted"
        );

        Ok(Outcome::Persisted { ranking_id, entries })
    }

    /// Read phase: `None` when the entity list is missing
    pub async fn compute(&self) -> Result<Option<Ranking>> {
        let layout = &self.config.layout;
        let source = layout.source_path();

        let Some(doc) = self.store.get_document(&source).await? else {
            return Ok(None);
        };

        let records = parse_entity_list(&doc, &layout.source_field, &source)?;
        let dictionary = NameDictionary::from_records(&records);

        let n = self.entity_count().await?;
        info!(
            entities = records.len(),
            distinct = dictionary.len(),
            n,
            direction = %self.config.sort_direction,
            "Aggregating shards"
        );

        let aggregator =
            ShardAggregator::new(self.store.as_ref(), layout, self.config.fetch_concurrency);
        let entries = aggregator.aggregate(n, &dictionary).await?;

        Ok(Some(compose_ranking(entries, self.config.sort_direction)))
    }

    async fn entity_count(&self) -> Result<u64> {
        match self.config.entity_count {
            EntityCount::Fixed(n) => Ok(n),
            EntityCount::Live => {
                self.store
                    .count_collection(&self.config.layout.ratings_collection)
                    .await
            }
        }
    }

    async fn persist(&self, ranking: Ranking) -> Result<String> {
        let payload = RankingDoc {
            ranking: ranking.into_entries(),
        }
        .to_payload()?;

        let timestamp_field = self.config.stamp_created_at.then_some(CREATED_AT_FIELD);
        self.store
            .create_document(&self.config.layout.ranking_collection, payload, timestamp_field)
            .await
    }
}
