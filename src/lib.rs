//! Ranking aggregator - sharded vote counters to persisted leaderboards
//!
//! Reads an entity list and per-entity counter shards from a document
//! store, sums the shards, attaches display names, sorts, and writes each
//! result as a new ranking snapshot.
//!
//! ## Triggers
//!
//! - **HTTP**: `POST /aggregate-ranking`, guarded by the `x-api-key` shared secret
//! - **Callable**: `POST /callable/aggregate-ranking` or the `ranking-aggregate` binary
//!
//! Both go through [`ranking::RankingPipeline`].

pub mod auth;
pub mod config;
pub mod db;
pub mod logging;
pub mod ranking;
pub mod routes;
pub mod server;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{RankingError, Result};
