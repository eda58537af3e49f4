//! Entity-list document schema
//!
//! The source document holds an array of `{ id, name, url }` records under a
//! configurable field (`characters` by default).

use bson::{Bson, Document};
use serde::{Deserialize, Serialize};

use crate::db::store::DocumentPath;
use crate::types::{RankingError, Result};

/// One ranked subject as stored in the entity list
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EntityRecord {
    /// Stable id, also the zero-padded shard group id
    pub id: String,

    /// Display name shown in rankings
    pub name: String,

    /// Link carried for other consumers; the ranking never reads it
    #[serde(default)]
    pub url: String,
}

impl EntityRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: String::new(),
        }
    }
}

/// Validate the entity array of a source document
pub fn parse_entity_list(
    doc: &Document,
    field: &str,
    path: &DocumentPath,
) -> Result<Vec<EntityRecord>> {
    let records = match doc.get(field) {
        Some(Bson::Array(items)) => items,
        Some(other) => {
            return Err(RankingError::malformed(
                path.to_string(),
                format!("field '{}' is {:?}, expected an array", field, other.element_type()),
            ))
        }
        None => {
            return Err(RankingError::malformed(
                path.to_string(),
                format!("missing field '{}'", field),
            ))
        }
    };

    records
        .iter()
        .enumerate()
        .map(|(index, item)| {
            bson::from_bson::<EntityRecord>(item.clone()).map_err(|e| {
                RankingError::malformed(format!("{}.{}[{}]", path, field, index), e)
            })
        })
        .collect()
}
