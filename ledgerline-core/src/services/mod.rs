pub mod cache;
pub mod categorize;
pub mod ledger;
pub mod reconcile;

pub use cache::NormalizationCache;
pub use categorize::{Categorizer, UncategorizedSummary};
pub use ledger::{BuildOutcome, BuildProblem, LedgerBuilder};
pub use reconcile::{DuplicateConflict, ReconcileOutcome, Reconciler};
