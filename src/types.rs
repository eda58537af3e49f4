//! Shared error type for the ranking aggregator

use thiserror::Error;

/// Errors raised anywhere inside the aggregation core.
///
/// Trigger adapters never forward these to callers; they are logged and
/// collapsed into a generic failure envelope.
#[derive(Debug, Error)]
pub enum RankingError {
    /// Store connectivity or query failure
    #[error("Database error: {0}")]
    Database(String),

    /// A stored document did not match the expected shape
    #[error("Malformed record at {path}: {reason}")]
    MalformedRecord { path: String, reason: String },

    /// Summing an entity's shards exceeded the counter range
    #[error("Counter overflow while summing shards of {0}")]
    CounterOverflow(String),

    /// The invocation deadline expired before aggregation finished
    #[error("Aggregation timed out after {0} ms")]
    Timeout(u64),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RankingError {
    pub fn malformed(path: impl Into<String>, reason: impl ToString) -> Self {
        RankingError::MalformedRecord {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RankingError>;
