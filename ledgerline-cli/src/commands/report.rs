//! Report command - build a ledger from a spec and write its analyses

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use colored::Colorize;
use rust_decimal::Decimal;

use ledgerline_core::{BuildOutcome, LedgerContext, Transaction, UNCATEGORIZED};

use crate::output;

/// Available analyses, in the order they run
pub const ANALYSES: &[&str] = &[
    "balance",
    "merged-csv",
    "sorted-csv",
    "large-transactions-csv",
    "category-spending",
];

pub fn run(
    spec: &Path,
    out: &Path,
    analyses: &[String],
    cache_dir: &Path,
    large_threshold: Decimal,
    json: bool,
) -> Result<()> {
    // Reject typos before any normalization work happens
    for name in analyses {
        if !ANALYSES.contains(&name.as_str()) {
            bail!(
                "unknown analysis '{}' (available: {})",
                name,
                ANALYSES.join(", ")
            );
        }
    }
    let selected: Vec<&str> = if analyses.is_empty() {
        ANALYSES.to_vec()
    } else {
        ANALYSES
            .iter()
            .copied()
            .filter(|a| analyses.iter().any(|n| n == a))
            .collect()
    };

    let ctx = LedgerContext::new(spec, cache_dir)
        .with_context(|| format!("failed to load spec {}", spec.display()))?;
    let outcome = ctx.build()?;

    fs::create_dir_all(out)?;
    let mut artifacts: Vec<PathBuf> = Vec::new();
    let spending = category_spending(&outcome);

    for analysis in &selected {
        match *analysis {
            "merged-csv" => {
                artifacts.push(write_transactions_csv(
                    &out.join("merged.csv"),
                    outcome.ledger.entries(),
                )?);
            }
            "sorted-csv" => {
                let mut entries = outcome.ledger.entries().to_vec();
                entries.sort_by_key(|tx| tx.amount);
                artifacts.push(write_transactions_csv(
                    &out.join("sorted_by_amount.csv"),
                    &entries,
                )?);
            }
            "large-transactions-csv" => {
                let large: Vec<Transaction> = outcome
                    .ledger
                    .iter()
                    .filter(|tx| tx.amount.abs() >= large_threshold)
                    .cloned()
                    .collect();
                artifacts.push(write_transactions_csv(
                    &out.join("large_transactions.csv"),
                    &large,
                )?);
            }
            "category-spending" => {
                artifacts.push(write_category_spending(
                    &out.join("category_spending.csv"),
                    &spending,
                )?);
            }
            // balance is print-only
            _ => {}
        }
    }

    // Review file: everything no rule matched, ready for a rules pass
    if outcome.uncategorized.count > 0 {
        let missed: Vec<Transaction> = outcome
            .ledger
            .iter()
            .filter(|tx| tx.category.as_deref() == Some(UNCATEGORIZED))
            .cloned()
            .collect();
        artifacts.push(write_transactions_csv(
            &out.join("uncategorized.csv"),
            &missed,
        )?);
    }

    if json {
        print_json(&outcome, &selected, &spending, &artifacts)
    } else {
        print_report(&outcome, &selected, &spending, &artifacts);
        Ok(())
    }
}

/// Per-category totals over the whole ledger, in category order
fn category_spending(outcome: &BuildOutcome) -> BTreeMap<String, Decimal> {
    let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
    for tx in outcome.ledger.iter() {
        let category = tx.category.clone().unwrap_or_else(|| UNCATEGORIZED.to_string());
        *totals.entry(category).or_default() += tx.amount;
    }
    totals
}

fn write_transactions_csv(path: &Path, entries: &[Transaction]) -> Result<PathBuf> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "date",
        "amount",
        "description",
        "source",
        "category",
        "supercategory",
        "group",
        "alt_source",
        "alt_source_description",
    ])?;
    for tx in entries {
        writer.write_record([
            tx.date.to_string(),
            tx.amount.to_string(),
            tx.description.clone(),
            tx.source.clone(),
            tx.category.clone().unwrap_or_default(),
            tx.supercategory.clone().unwrap_or_default(),
            tx.group.clone().unwrap_or_default(),
            tx.alt_source.clone().unwrap_or_default(),
            tx.alt_source_description.clone().unwrap_or_default(),
        ])?;
    }
    writer.flush()?;
    Ok(path.to_path_buf())
}

fn write_category_spending(path: &Path, spending: &BTreeMap<String, Decimal>) -> Result<PathBuf> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["category", "total"])?;
    for (category, total) in spending {
        writer.write_record([category.clone(), total.to_string()])?;
    }
    writer.flush()?;
    Ok(path.to_path_buf())
}

fn print_report(
    outcome: &BuildOutcome,
    selected: &[&str],
    spending: &BTreeMap<String, Decimal>,
    artifacts: &[PathBuf],
) {
    println!(
        "{}",
        format!(
            "Ledger {} to {}",
            outcome.ledger.date_start(),
            outcome.ledger.date_end()
        )
        .bold()
    );
    println!();

    let mut table = output::create_table();
    table.add_row(vec!["Entries".to_string(), outcome.ledger.len().to_string()]);
    table.add_row(vec![
        "Files read".to_string(),
        outcome.files_read.to_string(),
    ]);
    if selected.contains(&"balance") {
        table.add_row(vec![
            "Balance".to_string(),
            output::format_dollars(outcome.ledger.balance()),
        ]);
    }
    table.add_row(vec![
        "Duplicates merged".to_string(),
        outcome.duplicates_merged.to_string(),
    ]);
    table.add_row(vec![
        "Uncategorized".to_string(),
        format!(
            "{} ({})",
            outcome.uncategorized.count,
            output::format_dollars(outcome.uncategorized.total_amount)
        ),
    ]);
    println!("{}", table);
    println!();

    if selected.contains(&"category-spending") && !spending.is_empty() {
        println!("{}", "Totals by category".bold());
        let mut table = output::create_table();
        table.set_header(vec!["Category", "Total"]);
        for (category, total) in spending {
            table.add_row(vec![category.clone(), output::format_dollars(*total)]);
        }
        println!("{}", table);
        println!();
    }

    // Conflicts appear here too: the builder reports each one as a problem
    for problem in &outcome.problems {
        output::warning(&format!("problem: {}", problem));
    }
    for artifact in artifacts {
        output::info(&format!("wrote {}", artifact.display()));
    }
    output::success("report complete");
}

fn print_json(
    outcome: &BuildOutcome,
    selected: &[&str],
    spending: &BTreeMap<String, Decimal>,
    artifacts: &[PathBuf],
) -> Result<()> {
    let balance = selected
        .contains(&"balance")
        .then(|| outcome.ledger.balance());
    let value = serde_json::json!({
        "date_start": outcome.ledger.date_start(),
        "date_end": outcome.ledger.date_end(),
        "entries": outcome.ledger.len(),
        "files_read": outcome.files_read,
        "duplicates_merged": outcome.duplicates_merged,
        "balance": balance,
        "uncategorized": {
            "count": outcome.uncategorized.count,
            "total_amount": outcome.uncategorized.total_amount,
        },
        "category_spending": spending,
        "problems": outcome.problems.iter().map(|p| p.to_string()).collect::<Vec<_>>(),
        "conflicts": outcome.conflicts,
        "artifacts": artifacts,
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_report_writes_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("data/2024/manual")).unwrap();
        fs::write(
            root.join("spec.yaml"),
            "data_dir: data\nrules_file: rules.yaml\n\
             date_start: 2024-01-01\ndate_end: 2024-12-31\n\
             sources:\n  - name: manual\n    format: generic-csv\n",
        )
        .unwrap();
        fs::write(
            root.join("rules.yaml"),
            "rules:\n  - match: keyword\n    pattern: coffee\n    category: dining\n\
             groups:\n  - name: spending\n    supercategories:\n      - name: food\n        categories: [dining]\n",
        )
        .unwrap();
        fs::write(
            root.join("data/2024/manual/cash.csv"),
            "Date,Description,Amount\n2024-01-05,COFFEE SHOP,-42.50\n2024-01-06,MYSTERY,-600.00\n",
        )
        .unwrap();

        let out = root.join("reports");
        run(
            &root.join("spec.yaml"),
            &out,
            &[],
            &root.join("cache"),
            dec!(500),
            true,
        )
        .unwrap();

        assert!(out.join("merged.csv").is_file());
        assert!(out.join("sorted_by_amount.csv").is_file());
        assert!(out.join("large_transactions.csv").is_file());
        assert!(out.join("category_spending.csv").is_file());
        // MYSTERY matched no rule, so the review file is produced
        assert!(out.join("uncategorized.csv").is_file());

        let large = fs::read_to_string(out.join("large_transactions.csv")).unwrap();
        assert!(large.contains("MYSTERY"));
        assert!(!large.contains("COFFEE"));
    }

    #[test]
    fn test_unknown_analysis_rejected_before_any_work() {
        let err = run(
            Path::new("does-not-exist.yaml"),
            Path::new("out"),
            &["blance".to_string()],
            Path::new("cache"),
            dec!(500),
            false,
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown analysis 'blance'"));
    }
}
