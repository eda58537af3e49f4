//! Document schemas
//!
//! Typed views over the raw documents the store returns. Every read is
//! validated here before the ranking core sees it.

mod entity;
mod ranking;
mod shard;

pub use entity::{parse_entity_list, EntityRecord};
pub use ranking::{RankingDoc, CREATED_AT_FIELD};
pub use shard::ShardRecord;
