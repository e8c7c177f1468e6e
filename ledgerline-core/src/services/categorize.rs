//! Rule-driven categorization
//!
//! Assigns each transaction a category (and its supercategory and group
//! from the category tree) by matching its description against the loaded
//! rules. Exact rules always win over keyword rules; within a kind, the
//! first rule in file order wins. Anything no rule matches gets the
//! `uncategorized` sentinel so downstream totals never lose records.

use rust_decimal::Decimal;

use crate::domain::rule::{Categorization, MatchKind, UNCATEGORIZED};
use crate::domain::Transaction;

/// What fell through the rules during one `apply` pass
#[derive(Debug, Clone, PartialEq)]
pub struct UncategorizedSummary {
    pub count: usize,
    pub total_amount: Decimal,
}

pub struct Categorizer {
    exact: Vec<(String, String)>,
    keyword: Vec<(String, String)>,
    // category -> (supercategory, group)
    parents: std::collections::HashMap<String, (String, String)>,
}

impl Categorizer {
    pub fn new(categorization: &Categorization) -> Self {
        let mut exact = Vec::new();
        let mut keyword = Vec::new();
        for rule in &categorization.rules {
            let entry = (rule.pattern.to_lowercase(), rule.category.clone());
            match rule.match_kind {
                MatchKind::Exact => exact.push(entry),
                MatchKind::Keyword => keyword.push(entry),
            }
        }

        let parents = categorization
            .category_parents()
            .into_iter()
            .map(|(cat, (sup, grp))| (cat.to_string(), (sup.to_string(), grp.to_string())))
            .collect();

        Self {
            exact,
            keyword,
            parents,
        }
    }

    /// Category for one description, or the `uncategorized` sentinel
    pub fn categorize(&self, description: &str) -> &str {
        let needle = description.trim().to_lowercase();

        for (pattern, category) in &self.exact {
            if needle == *pattern {
                return category;
            }
        }
        for (pattern, category) in &self.keyword {
            if needle.contains(pattern.as_str()) {
                return category;
            }
        }
        UNCATEGORIZED
    }

    /// Categorize every record in place and summarize what fell through
    pub fn apply(&self, transactions: &mut [Transaction]) -> UncategorizedSummary {
        let mut count = 0;
        let mut total_amount = Decimal::ZERO;

        for tx in transactions.iter_mut() {
            let category = self.categorize(&tx.description);
            if category == UNCATEGORIZED {
                count += 1;
                total_amount += tx.amount;
            }
            tx.category = Some(category.to_string());
            if let Some((supercategory, group)) = self.parents.get(category) {
                tx.supercategory = Some(supercategory.clone());
                tx.group = Some(group.clone());
            }
        }

        UncategorizedSummary {
            count,
            total_amount,
        }
    }
}
