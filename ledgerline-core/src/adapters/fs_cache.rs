//! Filesystem cache store - one JSON artifact per cache key
//!
//! Layout: `<root>/<year>/<source>/<fingerprint>.json`. Every entry is a
//! standalone human-deletable file, which is the documented escape hatch for
//! clearing stale results without touching other entries.

use std::fs;
use std::path::PathBuf;

use tempfile::NamedTempFile;

use crate::domain::result::{Error, Result};
use crate::domain::Transaction;
use crate::ports::{CacheKey, CacheStore};

pub struct FsCacheStore {
    root: PathBuf,
}

impl FsCacheStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn entry_dir(&self, key: &CacheKey) -> PathBuf {
        self.root.join(key.year.to_string()).join(&key.source)
    }

    fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.entry_dir(key).join(format!("{}.json", key.fingerprint))
    }
}

impl CacheStore for FsCacheStore {
    fn load(&self, key: &CacheKey) -> Result<Option<Vec<Transaction>>> {
        let path = self.entry_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).map_err(|e| Error::CacheRead {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        let records = serde_json::from_str(&content).map_err(|e| Error::CacheRead {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Some(records))
    }

    fn store(&self, key: &CacheKey, records: &[Transaction]) -> Result<()> {
        let dir = self.entry_dir(key);
        fs::create_dir_all(&dir)?;

        // Write to a temp file in the destination directory, then rename, so
        // a crash mid-write never leaves a partial artifact behind the key
        let file = NamedTempFile::new_in(&dir)?;
        serde_json::to_writer_pretty(file.as_file(), records)?;
        file.persist(self.entry_path(key))
            .map_err(|e| Error::Io(e.error))?;
        Ok(())
    }
}
