//! Entity id -> display name lookup

use std::collections::HashMap;

use crate::db::schemas::EntityRecord;

/// Name shown for entities missing from the entity list
pub const UNKNOWN_NAME: &str = "Unknown";

/// Lookup from entity id to display name, built once per run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameDictionary {
    names: HashMap<String, String>,
}

impl NameDictionary {
    /// Build from entity records. A repeated id keeps the name of its last occurrence.
    pub fn from_records(records: &[EntityRecord]) -> Self {
        let names = records
            .iter()
            .map(|record| (record.id.clone(), record.name.clone()))
            .collect();
        Self { names }
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// Display name for `id`, or [`UNKNOWN_NAME`]
    pub fn name_for(&self, id: &str) -> &str {
        self.get(id).unwrap_or(UNKNOWN_NAME)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
