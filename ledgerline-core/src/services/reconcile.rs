//! Cross-source reconciliation
//!
//! Merges per-source transaction sets for one period into a single
//! deduplicated, date-ordered set. Candidate duplicates are grouped by the
//! records' dedup key (date + amount + normalized description); within a
//! group spanning several sources, the source with the highest configured
//! priority wins and the dropped side is recorded on the kept records as an
//! audit trail. A group no priority can resolve is never silently dropped:
//! every record stays and the group is surfaced as a conflict.

use std::collections::HashMap;

use chrono::NaiveDate;
use log::warn;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::Transaction;

/// One duplicate group the configured priorities could not resolve
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateConflict {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub description: String,
    pub sources: Vec<String>,
}

pub struct ReconcileOutcome {
    /// Date-ordered, deduplicated records, each still carrying its source
    pub transactions: Vec<Transaction>,
    /// Unresolvable duplicate groups; their records are all in `transactions`
    pub conflicts: Vec<DuplicateConflict>,
    /// Number of records dropped as cross-source duplicates
    pub duplicates_merged: usize,
}

pub struct Reconciler {
    /// Source name to priority; higher wins. Sources without an entry never
    /// win a duplicate group on their own.
    priorities: HashMap<String, i32>,
}

impl Reconciler {
    pub fn new(priorities: HashMap<String, i32>) -> Self {
        Self { priorities }
    }

    /// Merge per-source record sets, keeping only records inside the
    /// requested date range
    pub fn reconcile(
        &self,
        sets: Vec<Vec<Transaction>>,
        date_start: NaiveDate,
        date_end: NaiveDate,
    ) -> ReconcileOutcome {
        let mut all: Vec<Transaction> = sets
            .into_iter()
            .flatten()
            .filter(|tx| tx.date >= date_start && tx.date <= date_end)
            .collect();

        // Stable sort: within a day, records keep their statement order
        all.sort_by_key(|tx| tx.date);

        let mut groups: HashMap<&str, Vec<usize>> = HashMap::new();
        for (i, tx) in all.iter().enumerate() {
            groups.entry(tx.raw_key.as_str()).or_default().push(i);
        }

        let mut keep = vec![true; all.len()];
        let mut alt: HashMap<usize, (String, String)> = HashMap::new();
        let mut conflicts = Vec::new();
        let mut duplicates_merged = 0;

        for indexes in groups.values() {
            let mut sources: Vec<&str> = indexes.iter().map(|&i| all[i].source.as_str()).collect();
            sources.sort_unstable();
            sources.dedup();

            // Repeats within a single source are distinct real transactions
            if sources.len() < 2 {
                continue;
            }

            let winner = match self.pick_winner(&sources) {
                Some(winner) => winner,
                None => {
                    let first = &all[indexes[0]];
                    conflicts.push(DuplicateConflict {
                        date: first.date,
                        amount: first.amount,
                        description: first.description.clone(),
                        sources: sources.iter().map(|s| s.to_string()).collect(),
                    });
                    continue;
                }
            };

            let kept: Vec<usize> = indexes
                .iter()
                .copied()
                .filter(|&i| all[i].source == winner)
                .collect();
            let dropped: Vec<usize> = indexes
                .iter()
                .copied()
                .filter(|&i| all[i].source != winner)
                .collect();

            // A count disagreement between sources is suspicious but not
            // fatal: the winner's copies are authoritative
            for source in &sources {
                if *source == winner {
                    continue;
                }
                let reported = indexes
                    .iter()
                    .filter(|&&i| all[i].source == *source)
                    .count();
                if reported != kept.len() {
                    warn!(
                        "{}: '{}' reported {} copies of \"{}\" but winner '{}' reported {}",
                        all[indexes[0]].date,
                        source,
                        reported,
                        all[indexes[0]].description,
                        winner,
                        kept.len()
                    );
                }
            }

            duplicates_merged += dropped.len();
            for (slot, &i) in kept.iter().enumerate() {
                if let Some(&j) = dropped.get(slot).or_else(|| dropped.first()) {
                    alt.insert(i, (all[j].source.clone(), all[j].description.clone()));
                }
            }
            for &i in &dropped {
                keep[i] = false;
            }
        }

        // Group iteration order is not deterministic; conflict order must be
        conflicts.sort_by(|a, b| {
            (a.date, &a.description, &a.sources).cmp(&(b.date, &b.description, &b.sources))
        });

        let transactions = all
            .into_iter()
            .enumerate()
            .filter(|(i, _)| keep[*i])
            .map(|(i, mut tx)| {
                if let Some((source, description)) = alt.remove(&i) {
                    tx.alt_source = Some(source);
                    tx.alt_source_description = Some(description);
                }
                tx
            })
            .collect();

        ReconcileOutcome {
            transactions,
            conflicts,
            duplicates_merged,
        }
    }

    /// The unique highest-priority source in a duplicate group, if any
    fn pick_winner<'a>(&self, sources: &[&'a str]) -> Option<&'a str> {
        let mut best: Option<(i32, &str)> = None;
        let mut tied = false;

        for &source in sources {
            if let Some(&priority) = self.priorities.get(source) {
                match best {
                    None => {
                        best = Some((priority, source));
                        tied = false;
                    }
                    Some((current, _)) if priority > current => {
                        best = Some((priority, source));
                        tied = false;
                    }
                    Some((current, _)) if priority == current => tied = true,
                    _ => {}
                }
            }
        }

        match best {
            Some((_, source)) if !tied => Some(source),
            _ => None,
        }
    }
}
