//! Rules command - validate a categorization rules file

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use ledgerline_core::domain::{Categorization, MatchKind};

use crate::output;

pub fn run(rules_file: &Path, json: bool) -> Result<()> {
    let categorization = Categorization::from_yaml_file(rules_file)
        .with_context(|| format!("invalid rules file {}", rules_file.display()))?;

    let exact = categorization
        .rules
        .iter()
        .filter(|r| r.match_kind == MatchKind::Exact)
        .count();
    let keyword = categorization.rules.len() - exact;
    let categories = categorization.categories();

    // Categories no rule can ever assign are usually a sign of a stale tree
    let mut unused: Vec<&str> = categories
        .iter()
        .copied()
        .filter(|c| !categorization.rules.iter().any(|r| r.category == *c))
        .collect();
    unused.sort_unstable();

    if json {
        let value = serde_json::json!({
            "rules": categorization.rules.len(),
            "exact": exact,
            "keyword": keyword,
            "categories": categories.len(),
            "groups": categorization.groups.len(),
            "unused_categories": unused,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", format!("Rules file {}", rules_file.display()).bold());
    println!();

    let mut table = output::create_table();
    table.add_row(vec![
        "Rules".to_string(),
        format!("{} ({} exact, {} keyword)", categorization.rules.len(), exact, keyword),
    ]);
    table.add_row(vec!["Categories".to_string(), categories.len().to_string()]);
    table.add_row(vec![
        "Groups".to_string(),
        categorization.groups.len().to_string(),
    ]);
    println!("{}", table);

    for category in &unused {
        output::warning(&format!("no rule assigns category '{}'", category));
    }
    output::success("rules file is valid");
    Ok(())
}
