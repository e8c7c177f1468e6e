//! End-to-end pipeline tests
//!
//! Each test lays out a real data directory under a tempdir - spec file,
//! rules file, per-year per-source raw exports - and drives the whole
//! pipeline through `LedgerContext`.
//!
//! Run with: cargo test --test pipeline_tests

use std::fs;
use std::path::Path;

use rust_decimal_macros::dec;
use tempfile::TempDir;

use ledgerline_core::{Error, LedgerContext, UNCATEGORIZED};

const RULES: &str = "\
rules:
  - match: keyword
    pattern: coffee
    category: dining
  - match: keyword
    pattern: payroll
    category: salary
  - match: keyword
    pattern: venmo cashout
    category: transfers
  - match: keyword
    pattern: birthday
    category: gifts
groups:
  - name: spending
    supercategories:
      - name: food
        categories: [dining]
  - name: income
    supercategories:
      - name: work
        categories: [salary]
      - name: other
        categories: [gifts]
  - name: internal
    supercategories:
      - name: movement
        categories: [transfers]
";

const SPEC: &str = "\
data_dir: data
rules_file: rules.yaml
date_start: 2024-01-01
date_end: 2024-12-31
sources:
  - name: wf-checking
    format: wells-fargo
    priority: 10
  - name: venmo
    format: venmo
  - name: manual
    format: generic-csv
";

const WF_CHECKING: &str = "\
\"01/05/2024\",\"-42.50\",\"*\",\"\",\"COFFEE SHOP #1\"
\"01/09/2024\",\"200.00\",\"*\",\"\",\"VENMO CASHOUT\"
\"01/15/2024\",\"1000.00\",\"*\",\"\",\"EMPLOYER PAYROLL 0123\"
";

// The 01/09 Standard Transfer is the venmo side of the wf-checking cashout
const VENMO: &str = "\
Account Statement - (@user) - January 2024
Account Activity
,ID,Datetime,Type,Status,Note,From,To,Amount (total),Balance
,,,,,,,,,
,100,2024-01-05T09:12:00,Payment,Complete,Coffee,Alice,Bob,\"- $12.50\",
,101,2024-01-09T17:40:00,Standard Transfer,Complete,,Alice,,\"$ 200.00\",
,,,,,,,,,\"$ 187.50\"
";

const MANUAL: &str = "\
Date,Description,Amount
2024-02-01,BIRTHDAY CASH,50.00
2024-02-03,MYSTERY CHARGE,-9.99
";

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Lay out a complete reporting directory and return it
fn setup_with_spec(spec: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(&root.join("spec.yaml"), spec);
    write(&root.join("rules.yaml"), RULES);
    write(&root.join("data/2024/wf-checking/export.csv"), WF_CHECKING);
    write(&root.join("data/2024/venmo/statement.csv"), VENMO);
    write(&root.join("data/2024/manual/cash.csv"), MANUAL);
    dir
}

fn setup() -> TempDir {
    setup_with_spec(SPEC)
}

fn context(dir: &TempDir) -> LedgerContext {
    LedgerContext::new(&dir.path().join("spec.yaml"), &dir.path().join("cache")).unwrap()
}

fn cache_entry_count(dir: &TempDir) -> usize {
    walkdir(&dir.path().join("cache"))
}

fn walkdir(path: &Path) -> usize {
    let mut count = 0;
    for entry in fs::read_dir(path).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            count += walkdir(&path);
        } else if path.extension().is_some_and(|e| e == "json") {
            count += 1;
        }
    }
    count
}

#[test]
fn test_build_normalizes_reconciles_and_categorizes() {
    let dir = setup();
    let outcome = context(&dir).build().unwrap();

    assert!(outcome.problems.is_empty());
    assert!(outcome.conflicts.is_empty());
    assert_eq!(outcome.files_read, 3);

    // 7 raw records, one cross-source duplicate (the venmo cashout)
    assert_eq!(outcome.ledger.len(), 6);
    assert_eq!(outcome.duplicates_merged, 1);

    // The prioritized bank side won; the venmo side survives as audit trail
    let cashout = outcome
        .ledger
        .iter()
        .find(|tx| tx.description == "VENMO CASHOUT")
        .unwrap();
    assert_eq!(cashout.source, "wf-checking");
    assert_eq!(cashout.alt_source.as_deref(), Some("venmo"));
    assert_eq!(cashout.alt_source_description.as_deref(), Some("Venmo Cashout"));
    assert_eq!(cashout.category.as_deref(), Some("transfers"));
    assert_eq!(cashout.group.as_deref(), Some("internal"));

    // Entries come out date-ordered
    let dates: Vec<_> = outcome.ledger.iter().map(|tx| tx.date).collect();
    let mut sorted = dates.clone();
    sorted.sort();
    assert_eq!(dates, sorted);

    // Nothing the rules miss disappears; it lands in the sentinel bucket
    let mystery = outcome
        .ledger
        .iter()
        .find(|tx| tx.description == "MYSTERY CHARGE")
        .unwrap();
    assert_eq!(mystery.category.as_deref(), Some(UNCATEGORIZED));
    assert_eq!(outcome.uncategorized.count, 1);
    assert_eq!(outcome.uncategorized.total_amount, dec!(-9.99));
}

#[test]
fn test_rebuild_reuses_cache() {
    let dir = setup();
    let ctx = context(&dir);

    let first = ctx.build().unwrap();
    assert_eq!(cache_entry_count(&dir), 3);

    let second = ctx.build().unwrap();
    assert_eq!(cache_entry_count(&dir), 3);
    assert_eq!(first.ledger.len(), second.ledger.len());
    assert_eq!(first.ledger.balance(), second.ledger.balance());
}

#[test]
fn test_edited_file_recomputes_and_keeps_old_artifact() {
    let dir = setup();
    let ctx = context(&dir);
    ctx.build().unwrap();

    let edited = format!("{}2024-03-01,GARAGE SALE,25.00\n", MANUAL);
    write(&dir.path().join("data/2024/manual/cash.csv"), &edited);

    let outcome = ctx.build().unwrap();
    assert_eq!(outcome.ledger.len(), 7);
    // New fingerprint means a new entry; the superseded one is retained
    assert_eq!(cache_entry_count(&dir), 4);
}

#[test]
fn test_missing_source_directory_is_recoverable() {
    let dir = setup();
    fs::remove_dir_all(dir.path().join("data/2024/venmo")).unwrap();

    let outcome = context(&dir).build().unwrap();

    assert_eq!(outcome.problems.len(), 1);
    let problem = &outcome.problems[0];
    assert_eq!(problem.year, 2024);
    assert_eq!(problem.source.as_deref(), Some("venmo"));
    assert!(matches!(problem.error, Error::MissingData { .. }));

    // The other sources still make it into the ledger
    assert_eq!(outcome.ledger.len(), 5);
}

#[test]
fn test_unknown_format_fails_before_reading_anything() {
    let spec = SPEC.replace("format: venmo", "format: mystery-bank");
    let dir = setup_with_spec(&spec);

    let err = context(&dir).build().unwrap_err();
    assert!(matches!(err, Error::UnknownSource(ref f) if f == "mystery-bank"));
    // Fatal means fatal: no cache artifacts were produced
    assert!(!dir.path().join("cache").exists() || cache_entry_count(&dir) == 0);
}

#[test]
fn test_equal_priority_duplicate_keeps_both_and_flags() {
    let spec = SPEC.replace("    priority: 10\n", "");
    let dir = setup_with_spec(&spec);

    let outcome = context(&dir).build().unwrap();

    // Without a priority the cashout pair cannot be resolved
    assert_eq!(outcome.ledger.len(), 7);
    assert_eq!(outcome.duplicates_merged, 0);
    assert_eq!(outcome.conflicts.len(), 1);
    let conflict = &outcome.conflicts[0];
    assert_eq!(conflict.amount, dec!(200.00));
    assert_eq!(conflict.sources, vec!["venmo", "wf-checking"]);

    // The conflict also surfaces in the aggregated problem list
    assert_eq!(outcome.problems.len(), 1);
    assert!(matches!(
        outcome.problems[0].error,
        Error::ReconciliationConflict { .. }
    ));
}

#[test]
fn test_corrupt_cache_entry_recovers() {
    let dir = setup();
    let ctx = context(&dir);
    ctx.build().unwrap();

    // Trash every persisted entry; the next build must quietly recompute
    corrupt_entries(&dir.path().join("cache"));

    let outcome = ctx.build().unwrap();
    assert_eq!(outcome.ledger.len(), 6);
    assert!(outcome.problems.is_empty());
}

fn corrupt_entries(path: &Path) {
    for entry in fs::read_dir(path).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            corrupt_entries(&path);
        } else {
            fs::write(&path, b"{ not json").unwrap();
        }
    }
}
