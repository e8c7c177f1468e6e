//! Normalization cache service
//!
//! Wraps a cache store with content fingerprinting: repeated runs over
//! unchanged raw files perform zero normalization work, and a given
//! `(year, source, fingerprint)` is computed at most once even under
//! concurrent callers. Caching is strictly a performance optimization -
//! any store failure degrades to recomputation, never to an error.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use log::{debug, warn};
use sha2::{Digest, Sha256};

use crate::domain::result::Result;
use crate::domain::Transaction;
use crate::ports::{CacheKey, CacheStore, Normalizer};

pub struct NormalizationCache {
    store: Arc<dyn CacheStore>,
    // Per-key guards so concurrent misses for the same key compute once.
    // Guards accumulate for the run's lifetime; the map is bounded by the
    // number of distinct (year, source, file) units in a run.
    inflight: Mutex<HashMap<CacheKey, Arc<Mutex<()>>>>,
}

impl NormalizationCache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Content fingerprint of a raw file (16 hex chars of SHA-256)
    pub fn fingerprint(raw: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(raw);
        let result = hasher.finalize();
        hex::encode(&result[..8])
    }

    /// Return the cached normalization of `raw`, computing and storing it on
    /// a miss. Unreadable entries count as misses.
    pub fn get_or_compute(
        &self,
        year: i32,
        source: &str,
        raw: &[u8],
        normalizer: &dyn Normalizer,
    ) -> Result<Vec<Transaction>> {
        let key = CacheKey::new(year, source, Self::fingerprint(raw));

        if let Some(records) = self.try_load(&key) {
            return Ok(records);
        }

        // Serialize computation per key; re-check the store once the guard is
        // held in case another caller finished first
        let guard = {
            let mut inflight = self.inflight.lock().unwrap();
            inflight
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        let _held = guard.lock().unwrap();

        if let Some(records) = self.try_load(&key) {
            return Ok(records);
        }

        debug!("normalizing {} ({} bytes)", key, raw.len());
        let records = normalizer.normalize(year, source, raw)?;

        if let Err(e) = self.store.store(&key, &records) {
            warn!("could not persist cache entry {}: {}", key, e);
        }
        Ok(records)
    }

    fn try_load(&self, key: &CacheKey) -> Option<Vec<Transaction>> {
        match self.store.load(key) {
            Ok(Some(records)) => {
                debug!("cache hit for {}, skipping normalization", key);
                Some(records)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("treating cache entry {} as a miss: {}", key, e);
                None
            }
        }
    }
}
