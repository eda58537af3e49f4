//! Configuration for the ranking aggregator
//!
//! CLI arguments and environment variable handling using clap.

use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::time::Duration;

use crate::db::StoreLayout;
use crate::ranking::{EntityCount, PipelineConfig, SortDirection};

/// Fallback shared secret used only when `DEV_MODE` is on and no key is set
const DEV_API_KEY: &str = "dev-only-insecure-key";

/// Where the entity count N comes from
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountSource {
    /// Use `ENTITY_COUNT` as a literal upper bound
    Fixed,
    /// Count documents in the ratings collection on every run
    Live,
}

/// Log output format
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Ranking aggregator - sums sharded vote counters into a leaderboard
#[derive(Parser, Debug, Clone)]
#[command(name = "ranking-aggregator")]
#[command(about = "Aggregates sharded vote counters into persisted rankings")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "rankings")]
    pub mongodb_db: String,

    /// Enable development mode (in-memory store fallback, dev API key)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// Shared secret expected in the `x-api-key` header (required in production)
    #[arg(long, env = "API_KEY")]
    pub api_key: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value = "text")]
    pub log_format: LogFormat,

    /// Deadline for the read phase of one aggregation, in milliseconds
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value = "30000")]
    pub request_timeout_ms: u64,

    /// Maximum number of shard collections fetched concurrently
    #[arg(long, env = "FETCH_CONCURRENCY", default_value = "8")]
    pub fetch_concurrency: usize,

    /// Collection holding the entity-list document
    #[arg(long, env = "SOURCE_COLLECTION", default_value = "develop")]
    pub source_collection: String,

    /// Id of the entity-list document
    #[arg(long, env = "SOURCE_DOCUMENT", default_value = "ZVP3ieLUu9RTLQN8vkIe")]
    pub source_document: String,

    /// Array field of the entity-list document holding the entity records
    #[arg(long, env = "SOURCE_FIELD", default_value = "characters")]
    pub source_field: String,

    /// Parent collection of the per-entity shard sub-collections
    #[arg(long, env = "RATINGS_COLLECTION", default_value = "ratings")]
    pub ratings_collection: String,

    /// Name of the shard sub-collection under each ratings document
    #[arg(long, env = "SHARDS_SUBCOLLECTION", default_value = "shards")]
    pub shards_subcollection: String,

    /// Collection that receives one new document per ranking run
    #[arg(long, env = "RANKING_COLLECTION", default_value = "ranking")]
    pub ranking_collection: String,

    /// How the number of ranked entities is determined
    #[arg(long, env = "ENTITY_COUNT_SOURCE", value_enum, default_value = "fixed")]
    pub entity_count_source: CountSource,

    /// Number of entities when ENTITY_COUNT_SOURCE=fixed
    #[arg(long, env = "ENTITY_COUNT", default_value = "89")]
    pub entity_count: u64,

    /// Ranking order by rating
    #[arg(long, env = "SORT_DIRECTION", value_enum, default_value = "desc")]
    pub sort_direction: SortDirection,

    /// Stamp each ranking document with a server-assigned `createdAt`
    #[arg(long, env = "STAMP_CREATED_AT", default_value = "true", action = clap::ArgAction::Set)]
    pub stamp_created_at: bool,
}

impl Args {
    /// Get effective API key (uses a fixed key in dev mode when none is set)
    pub fn api_key(&self) -> Option<String> {
        match (self.api_key.as_deref().filter(|k| !k.is_empty()), self.dev_mode) {
            (Some(key), _) => Some(key.to_string()),
            (None, true) => Some(DEV_API_KEY.to_string()),
            (None, false) => None,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Storage paths derived from the collection flags
    pub fn store_layout(&self) -> StoreLayout {
        StoreLayout {
            source_collection: self.source_collection.clone(),
            source_document: self.source_document.clone(),
            source_field: self.source_field.clone(),
            ratings_collection: self.ratings_collection.clone(),
            shards_subcollection: self.shards_subcollection.clone(),
            ranking_collection: self.ranking_collection.clone(),
        }
    }

    /// Build the pipeline configuration shared by both triggers
    pub fn pipeline_config(&self) -> PipelineConfig {
        let entity_count = match self.entity_count_source {
            CountSource::Fixed => EntityCount::Fixed(self.entity_count),
            CountSource::Live => EntityCount::Live,
        };

        PipelineConfig {
            layout: self.store_layout(),
            entity_count,
            sort_direction: self.sort_direction,
            fetch_concurrency: self.fetch_concurrency,
            deadline: self.request_timeout(),
            stamp_created_at: self.stamp_created_at,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.dev_mode && self.api_key.as_deref().map_or(true, str::is_empty) {
            return Err("API_KEY is required in production mode".to_string());
        }

        if self.fetch_concurrency == 0 {
            return Err("FETCH_CONCURRENCY must be at least 1".to_string());
        }

        if self.request_timeout_ms == 0 {
            return Err("REQUEST_TIMEOUT_MS must be greater than zero".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["ranking-aggregator"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults_match_legacy_layout() {
        let args = parse(&["--api-key", "secret"]);

        assert_eq!(args.source_collection, "develop");
        assert_eq!(args.source_document, "ZVP3ieLUu9RTLQN8vkIe");
        assert_eq!(args.ratings_collection, "ratings");
        assert_eq!(args.ranking_collection, "ranking");
        assert_eq!(args.entity_count, 89);
        assert_eq!(args.sort_direction, SortDirection::Desc);
        assert!(args.stamp_created_at);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_production_requires_api_key() {
        let args = parse(&[]);
        assert!(args.validate().is_err());
        assert_eq!(args.api_key(), None);
    }

    #[test]
    fn test_dev_mode_substitutes_key() {
        let args = parse(&["--dev-mode"]);
        assert!(args.validate().is_ok());
        assert_eq!(args.api_key().as_deref(), Some(DEV_API_KEY));
    }

    #[test]
    fn test_dev_mode_ignores_empty_key() {
        let args = parse(&["--dev-mode", "--api-key", ""]);
        assert!(args.validate().is_ok());
        assert_eq!(args.api_key().as_deref(), Some(DEV_API_KEY));

        let args = parse(&["--api-key", ""]);
        assert!(args.validate().is_err());
        assert_eq!(args.api_key(), None);
    }

    #[test]
    fn test_live_count_source() {
        let args = parse(&["--api-key", "k", "--entity-count-source", "live"]);
        assert_eq!(args.pipeline_config().entity_count, EntityCount::Live);
    }

    #[test]
    fn test_rejects_zero_concurrency() {
        let args = parse(&["--api-key", "k", "--fetch-concurrency", "0"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_stamp_can_be_disabled() {
        let args = parse(&["--api-key", "k", "--stamp-created-at", "false"]);
        assert!(!args.pipeline_config().stamp_created_at);
    }
}
