//! Normalizer port - per-format raw file normalization

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::result::{Error, Result};
use crate::domain::Transaction;

/// A per-format normalization strategy
///
/// Implementations must be pure and deterministic: the cache layer assumes
/// the same raw bytes always normalize to the same record sequence. They must
/// not touch the cache themselves; caching policy belongs to the caller.
pub trait Normalizer: Send + Sync {
    /// Normalize one raw export into transaction records.
    ///
    /// `source` is the configured source label stamped onto every record and
    /// `year` the filing period the file was found under.
    fn normalize(&self, year: i32, source: &str, raw: &[u8]) -> Result<Vec<Transaction>>;
}

/// Registry mapping a format name to its normalization strategy
///
/// Built once and passed into the ledger builder; there is no runtime
/// lookup-by-name beyond this explicit map.
#[derive(Default, Clone)]
pub struct NormalizerRegistry {
    normalizers: HashMap<String, Arc<dyn Normalizer>>,
}

impl NormalizerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, format: impl Into<String>, normalizer: Arc<dyn Normalizer>) {
        self.normalizers.insert(format.into(), normalizer);
    }

    /// Look up a format, failing with `UnknownSource` when unregistered
    pub fn get(&self, format: &str) -> Result<Arc<dyn Normalizer>> {
        self.normalizers
            .get(format)
            .cloned()
            .ok_or_else(|| Error::UnknownSource(format.to_string()))
    }

    /// Registered format names, sorted
    pub fn formats(&self) -> Vec<&str> {
        let mut formats: Vec<&str> = self.normalizers.keys().map(String::as_str).collect();
        formats.sort_unstable();
        formats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullNormalizer;

    impl Normalizer for NullNormalizer {
        fn normalize(&self, _year: i32, _source: &str, _raw: &[u8]) -> Result<Vec<Transaction>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_unregistered_format_is_an_error() {
        let registry = NormalizerRegistry::new();
        let err = registry.get("mystery-bank").map(|_| ()).unwrap_err();
        assert!(matches!(err, Error::UnknownSource(ref f) if f == "mystery-bank"));
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = NormalizerRegistry::new();
        registry.register("null", Arc::new(NullNormalizer));
        assert!(registry.get("null").is_ok());
        assert_eq!(registry.formats(), vec!["null"]);
    }
}
