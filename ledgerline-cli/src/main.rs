//! Ledgerline CLI - categorized ledgers from raw bank exports

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

mod commands;
mod output;

use commands::{cache, formats, report, rules};

/// Ledgerline - categorized ledgers from raw bank exports
#[derive(Parser)]
#[command(name = "lgr", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a ledger from a report spec and write its analyses
    Report {
        /// Path to the report spec (YAML)
        spec: PathBuf,
        /// Directory to write report artifacts into
        #[arg(long, default_value = "reports")]
        out: PathBuf,
        /// Analyses to run (default: all)
        #[arg(long = "analysis", value_delimiter = ',')]
        analyses: Vec<String>,
        /// Normalization cache directory
        #[arg(long, env = "LEDGERLINE_CACHE_DIR", default_value = ".ledgerline-cache")]
        cache_dir: PathBuf,
        /// Absolute amount cutoff for the large-transactions analysis
        #[arg(long, default_value = "500")]
        large_threshold: Decimal,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a categorization rules file
    Rules {
        /// Path to the rules file (YAML)
        rules_file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect or clear the normalization cache
    Cache {
        #[command(subcommand)]
        command: cache::CacheCommands,
    },

    /// List registered source formats
    Formats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Report {
            spec,
            out,
            analyses,
            cache_dir,
            large_threshold,
            json,
        } => report::run(&spec, &out, &analyses, &cache_dir, large_threshold, json),
        Commands::Rules { rules_file, json } => rules::run(&rules_file, json),
        Commands::Cache { command } => cache::run(command),
        Commands::Formats { json } => formats::run(json),
    }
}
