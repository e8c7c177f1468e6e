//! Ledgerline Core - transaction normalization and reporting pipeline
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core entities (Transaction, Ledger, categorization rules)
//! - **ports**: Trait definitions for external dependencies (Normalizer, CacheStore)
//! - **services**: Pipeline orchestration (cache, reconcile, categorize, build)
//! - **adapters**: Concrete implementations (per-bank normalizers, filesystem cache)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use adapters::FsCacheStore;

// Re-export commonly used types at crate root
pub use config::{ReportSpec, SourceSpec};
pub use domain::result::{Error, Result};
pub use domain::{Categorization, Ledger, Transaction, UNCATEGORIZED};
pub use services::{BuildOutcome, BuildProblem, DuplicateConflict, LedgerBuilder};

/// Main context for ledgerline operations
///
/// The primary entry point: loads a report spec and its rules file, wires
/// up the built-in normalizers and the on-disk cache, and builds ledgers.
pub struct LedgerContext {
    pub spec: ReportSpec,
    pub categorization: Categorization,
    builder: LedgerBuilder,
}

impl LedgerContext {
    /// Create a context from a spec file, caching under `cache_dir`
    pub fn new(spec_path: &Path, cache_dir: &Path) -> Result<Self> {
        let spec = ReportSpec::load(spec_path)?;
        let categorization = Categorization::from_yaml_file(&spec.rules_file)?;

        let builder = LedgerBuilder::new(
            adapters::builtin_registry(),
            Arc::new(FsCacheStore::new(cache_dir)),
            &categorization,
        );

        Ok(Self {
            spec,
            categorization,
            builder,
        })
    }

    /// Build the ledger the loaded spec describes
    pub fn build(&self) -> Result<BuildOutcome> {
        self.builder.build(&self.spec)
    }
}
