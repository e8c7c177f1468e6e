//! Ledger - the final ordered, deduplicated, categorized transaction sequence

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::Transaction;

/// Immutable snapshot of a reconciled, categorized ledger
///
/// Built once by the ledger builder and handed to the reporting layer;
/// entries are ordered by date and only readable after construction.
#[derive(Debug, Clone, Serialize)]
pub struct Ledger {
    entries: Vec<Transaction>,
    date_start: NaiveDate,
    date_end: NaiveDate,
}

impl Ledger {
    pub(crate) fn new(entries: Vec<Transaction>, date_start: NaiveDate, date_end: NaiveDate) -> Self {
        Self {
            entries,
            date_start,
            date_end,
        }
    }

    pub fn entries(&self) -> &[Transaction] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all entry amounts
    pub fn balance(&self) -> Decimal {
        self.entries.iter().map(|tx| tx.amount).sum()
    }

    pub fn date_start(&self) -> NaiveDate {
        self.date_start
    }

    pub fn date_end(&self) -> NaiveDate {
        self.date_end
    }
}
