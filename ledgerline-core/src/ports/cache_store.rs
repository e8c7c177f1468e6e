//! Cache store port - persisted normalization results

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::result::Result;
use crate::domain::Transaction;

/// Key for one cached normalization result
///
/// Keyed on a content fingerprint of the raw file, never its path: an edited
/// file gets a new key instead of silently reusing a stale entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub year: i32,
    pub source: String,
    pub fingerprint: String,
}

impl CacheKey {
    pub fn new(year: i32, source: impl Into<String>, fingerprint: impl Into<String>) -> Self {
        Self {
            year,
            source: source.into(),
            fingerprint: fingerprint.into(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.year, self.source, self.fingerprint)
    }
}

/// Persistent store for normalized record sequences
///
/// Entries are immutable once written; `store` for an existing key replaces
/// the artifact wholesale. Implementations must make writes atomic so a
/// crash mid-write never leaves a partial entry behind a valid key.
pub trait CacheStore: Send + Sync {
    fn load(&self, key: &CacheKey) -> Result<Option<Vec<Transaction>>>;
    fn store(&self, key: &CacheKey, records: &[Transaction]) -> Result<()>;
}
