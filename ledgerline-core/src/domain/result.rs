//! Result and error types for the core library

use std::path::PathBuf;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Core library error type
#[derive(Error, Debug)]
pub enum Error {
    /// A configured source names a format no normalizer is registered for.
    /// This is a configuration error and fails the build immediately.
    #[error("no normalizer registered for format '{0}'")]
    UnknownSource(String),

    /// A configured source has no raw files for a requested year. Recoverable:
    /// the ledger builder collects these and the caller decides the policy.
    #[error("missing raw data for source '{source_name}' in {year} (expected under {})", path.display())]
    MissingData {
        year: i32,
        source_name: String,
        path: PathBuf,
    },

    /// A persisted cache entry could not be read or parsed. The cache service
    /// downgrades this to a miss; it never fails a run.
    #[error("unreadable cache entry {key}: {reason}")]
    CacheRead { key: String, reason: String },

    /// A cross-source duplicate that no configured priority can resolve.
    /// Both sides are kept in the ledger and the group is surfaced for
    /// manual review.
    #[error("ambiguous duplicate on {date}: {amount} \"{description}\" reported by {sources} with no priority between them")]
    ReconciliationConflict {
        date: NaiveDate,
        amount: Decimal,
        description: String,
        sources: String,
    },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;
