//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

mod ledger;
mod transaction;
pub mod result;
pub mod rule;

pub use ledger::Ledger;
pub use rule::{
    Categorization, CategoryGroup, CategoryRule, MatchKind, Supercategory, UNCATEGORIZED,
};
pub use transaction::Transaction;
