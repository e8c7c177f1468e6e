//! Ledger builder - the end-to-end normalization pipeline
//!
//! Walks `<data_dir>/<year>/<source>/` for every year the spec's date range
//! touches, normalizes each raw file through the cache, reconciles the
//! per-source sets into one deduplicated sequence, and categorizes the
//! result. Per-unit failures (a missing source directory, an unparseable
//! file) are collected as problems so one bad statement never hides the
//! rest of the report; an unknown source format is a configuration error
//! and fails the build before any file is read.

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::Datelike;
use log::{info, warn};

use crate::config::ReportSpec;
use crate::domain::result::{Error, Result};
use crate::domain::rule::Categorization;
use crate::domain::{Ledger, Transaction};
use crate::ports::{CacheStore, Normalizer, NormalizerRegistry};
use crate::services::cache::NormalizationCache;
use crate::services::categorize::{Categorizer, UncategorizedSummary};
use crate::services::reconcile::{DuplicateConflict, Reconciler};

/// One recoverable failure encountered while building a ledger
#[derive(Debug)]
pub struct BuildProblem {
    pub year: i32,
    pub source: Option<String>,
    pub error: Error,
}

impl fmt::Display for BuildProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{}/{}: {}", self.year, source, self.error),
            None => write!(f, "{}: {}", self.year, self.error),
        }
    }
}

#[derive(Debug)]
pub struct BuildOutcome {
    pub ledger: Ledger,
    /// Recoverable per-unit failures; empty means a clean build
    pub problems: Vec<BuildProblem>,
    /// Duplicate groups no priority could resolve
    pub conflicts: Vec<DuplicateConflict>,
    pub uncategorized: UncategorizedSummary,
    pub duplicates_merged: usize,
    pub files_read: usize,
}

pub struct LedgerBuilder {
    registry: NormalizerRegistry,
    cache: NormalizationCache,
    categorizer: Categorizer,
}

impl LedgerBuilder {
    pub fn new(
        registry: NormalizerRegistry,
        store: Arc<dyn CacheStore>,
        categorization: &Categorization,
    ) -> Self {
        Self {
            registry,
            cache: NormalizationCache::new(store),
            categorizer: Categorizer::new(categorization),
        }
    }

    /// Build the ledger a spec describes
    pub fn build(&self, spec: &ReportSpec) -> Result<BuildOutcome> {
        // Every configured format must resolve before any work starts
        for source in &spec.sources {
            self.registry.get(&source.format)?;
        }

        let mut sets: Vec<Vec<Transaction>> = Vec::new();
        let mut problems = Vec::new();
        let mut files_read = 0;

        for year in spec.years() {
            for source in &spec.sources {
                let normalizer = self.registry.get(&source.format)?;
                match self.normalize_source(&spec.data_dir, year, &source.name, normalizer.as_ref())
                {
                    Ok((records, count)) => {
                        files_read += count;
                        sets.push(records);
                    }
                    Err(error) => {
                        warn!("{}/{}: {}", year, source.name, error);
                        problems.push(BuildProblem {
                            year,
                            source: Some(source.name.clone()),
                            error,
                        });
                    }
                }
            }
        }

        let reconciler = Reconciler::new(spec.priorities());
        let outcome = reconciler.reconcile(sets, spec.date_start, spec.date_end);

        // Ambiguous duplicates are kept in the ledger, but each one is also
        // reported as a problem so no run resolves them by silent guesswork
        for conflict in &outcome.conflicts {
            problems.push(BuildProblem {
                year: conflict.date.year(),
                source: None,
                error: Error::ReconciliationConflict {
                    date: conflict.date,
                    amount: conflict.amount,
                    description: conflict.description.clone(),
                    sources: conflict.sources.join(", "),
                },
            });
        }

        let mut entries = outcome.transactions;
        let uncategorized = self.categorizer.apply(&mut entries);

        info!(
            "built ledger: {} entries from {} files ({} duplicates merged, {} uncategorized)",
            entries.len(),
            files_read,
            outcome.duplicates_merged,
            uncategorized.count
        );

        Ok(BuildOutcome {
            ledger: Ledger::new(entries, spec.date_start, spec.date_end),
            problems,
            conflicts: outcome.conflicts,
            uncategorized,
            duplicates_merged: outcome.duplicates_merged,
            files_read,
        })
    }

    /// Normalize every raw file under `<data_dir>/<year>/<source>/`, in
    /// filename order
    fn normalize_source(
        &self,
        data_dir: &Path,
        year: i32,
        source: &str,
        normalizer: &dyn Normalizer,
    ) -> Result<(Vec<Transaction>, usize)> {
        let dir = data_dir.join(year.to_string()).join(source);
        if !dir.is_dir() {
            return Err(Error::MissingData {
                year,
                source_name: source.to_string(),
                path: dir,
            });
        }

        let mut paths: Vec<_> = fs::read_dir(&dir)?
            .collect::<std::io::Result<Vec<_>>>()?
            .into_iter()
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        paths.sort();

        if paths.is_empty() {
            return Err(Error::MissingData {
                year,
                source_name: source.to_string(),
                path: dir,
            });
        }

        let mut records = Vec::new();
        for path in &paths {
            let raw = fs::read(path)?;
            records.extend(self.cache.get_or_compute(year, source, &raw, normalizer)?);
        }
        Ok((records, paths.len()))
    }
}
