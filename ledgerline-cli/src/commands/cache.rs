//! Cache command - inspect and clear the normalization cache

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use crate::output;

#[derive(Subcommand)]
pub enum CacheCommands {
    /// Show cached entries per year and source
    Stats {
        /// Normalization cache directory
        #[arg(long, env = "LEDGERLINE_CACHE_DIR", default_value = ".ledgerline-cache")]
        cache_dir: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete every cached entry
    Clear {
        /// Normalization cache directory
        #[arg(long, env = "LEDGERLINE_CACHE_DIR", default_value = ".ledgerline-cache")]
        cache_dir: PathBuf,
    },
}

pub fn run(command: CacheCommands) -> Result<()> {
    match command {
        CacheCommands::Stats { cache_dir, json } => stats(&cache_dir, json),
        CacheCommands::Clear { cache_dir } => clear(&cache_dir),
    }
}

struct SourceStats {
    year: String,
    source: String,
    entries: usize,
    bytes: u64,
}

fn stats(cache_dir: &Path, json: bool) -> Result<()> {
    let mut rows: Vec<SourceStats> = Vec::new();

    if cache_dir.is_dir() {
        // Layout is <cache_dir>/<year>/<source>/<fingerprint>.json
        for year_entry in sorted_dirs(cache_dir)? {
            for source_entry in sorted_dirs(&year_entry)? {
                let mut entries = 0;
                let mut bytes = 0;
                for file in fs::read_dir(&source_entry)? {
                    let file = file?;
                    if file.path().extension().is_some_and(|e| e == "json") {
                        entries += 1;
                        bytes += file.metadata()?.len();
                    }
                }
                rows.push(SourceStats {
                    year: file_name(&year_entry),
                    source: file_name(&source_entry),
                    entries,
                    bytes,
                });
            }
        }
    }

    if json {
        let value = serde_json::json!(rows
            .iter()
            .map(|r| {
                serde_json::json!({
                    "year": r.year,
                    "source": r.source,
                    "entries": r.entries,
                    "bytes": r.bytes,
                })
            })
            .collect::<Vec<_>>());
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    if rows.is_empty() {
        output::info(&format!("no cache at {}", cache_dir.display()));
        return Ok(());
    }

    println!("{}", format!("Cache {}", cache_dir.display()).bold());
    let mut table = output::create_table();
    table.set_header(vec!["Year", "Source", "Entries", "Size"]);
    for row in &rows {
        table.add_row(vec![
            row.year.clone(),
            row.source.clone(),
            row.entries.to_string(),
            output::format_size(row.bytes),
        ]);
    }
    println!("{}", table);
    Ok(())
}

fn clear(cache_dir: &Path) -> Result<()> {
    if cache_dir.is_dir() {
        fs::remove_dir_all(cache_dir)?;
        output::success(&format!("cleared {}", cache_dir.display()));
    } else {
        output::info(&format!("no cache at {}", cache_dir.display()));
    }
    Ok(())
}

fn sorted_dirs(path: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs: Vec<PathBuf> = fs::read_dir(path)?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    Ok(dirs)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
