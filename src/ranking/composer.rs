//! Ranking composition: orders aggregated entries by rating

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ranking::RatingEntry;

/// Order of the ranking by rating
#[derive(ValueEnum, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Lowest rating first
    Asc,
    /// Highest rating first (leaderboard view)
    #[default]
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "asc"),
            SortDirection::Desc => write!(f, "desc"),
        }
    }
}

/// Immutable ordered ranking snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranking {
    entries: Vec<RatingEntry>,
}

impl Ranking {
    pub fn entries(&self) -> &[RatingEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<RatingEntry> {
        self.entries
    }
}

/// Sort entries by rating. The sort is stable: equal ratings keep input order.
pub fn compose_ranking(mut entries: Vec<RatingEntry>, direction: SortDirection) -> Ranking {
    match direction {
        SortDirection::Asc => entries.sort_by(|a, b| a.rating.cmp(&b.rating)),
        SortDirection::Desc => entries.sort_by(|a, b| b.rating.cmp(&a.rating)),
    }
    Ranking { entries }
}
