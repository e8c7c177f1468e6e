//! In-memory cache store
//!
//! Backs the CacheStore port with a plain map so the pipeline can be tested
//! without touching real disk.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::result::Result;
use crate::domain::Transaction;
use crate::ports::{CacheKey, CacheStore};

#[derive(Default)]
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<CacheKey, Vec<Transaction>>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct keys stored
    pub fn entry_count(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

impl CacheStore for MemoryCacheStore {
    fn load(&self, key: &CacheKey) -> Result<Option<Vec<Transaction>>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn store(&self, key: &CacheKey, records: &[Transaction]) -> Result<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.clone(), records.to_vec());
        Ok(())
    }
}
