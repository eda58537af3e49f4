//! Ranking aggregation core
//!
//! - **Dictionary**: entity id -> display name, last occurrence wins
//! - **Aggregator**: sums counter shards for entity indices `0..N`
//! - **Composer**: orders entries by rating in the configured direction
//! - **Pipeline**: one full run, consumed by the HTTP and callable triggers

pub mod aggregator;
pub mod composer;
pub mod dictionary;
pub mod pipeline;

pub use aggregator::{shard_group_id, sum_shards, RatingEntry, ShardAggregator, SHARD_ID_WIDTH};
pub use composer::{compose_ranking, Ranking, SortDirection};
pub use dictionary::{NameDictionary, UNKNOWN_NAME};
pub use pipeline::{EntityCount, Outcome, PipelineConfig, RankingPipeline};
