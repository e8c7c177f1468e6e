//! Report specification - the YAML file describing one reporting run
//!
//! A spec names the raw data directory, the categorization rules file, the
//! date range to report on, and the sources to pull in. Relative paths are
//! resolved against the spec file's own directory so a spec can travel with
//! its data.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;

use crate::domain::result::{Error, Result};

/// One configured transaction source
#[derive(Debug, Clone, Deserialize)]
pub struct SourceSpec {
    /// Directory name under `<data_dir>/<year>/` and the label stamped on
    /// every record from this source
    pub name: String,
    /// Registered normalizer format to parse this source's files with
    pub format: String,
    /// Reconciliation priority; higher wins duplicate groups. Sources
    /// without a priority never win one on their own.
    #[serde(default)]
    pub priority: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportSpec {
    pub data_dir: PathBuf,
    pub rules_file: PathBuf,
    pub date_start: NaiveDate,
    pub date_end: NaiveDate,
    pub sources: Vec<SourceSpec>,
}

impl ReportSpec {
    /// Load and validate a spec file, resolving relative paths against its
    /// parent directory
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let mut spec: ReportSpec = serde_yaml::from_str(&text)?;

        if let Some(base) = path.parent() {
            if spec.data_dir.is_relative() {
                spec.data_dir = base.join(&spec.data_dir);
            }
            if spec.rules_file.is_relative() {
                spec.rules_file = base.join(&spec.rules_file);
            }
        }

        spec.validate()?;
        Ok(spec)
    }

    pub fn validate(&self) -> Result<()> {
        if self.date_start > self.date_end {
            return Err(Error::validation(format!(
                "date_start {} is after date_end {}",
                self.date_start, self.date_end
            )));
        }
        if self.sources.is_empty() {
            return Err(Error::validation("spec lists no sources"));
        }

        let mut seen = HashSet::new();
        for source in &self.sources {
            if source.name.is_empty() {
                return Err(Error::validation("source with empty name"));
            }
            if !seen.insert(source.name.as_str()) {
                return Err(Error::validation(format!(
                    "duplicate source '{}'",
                    source.name
                )));
            }
        }
        Ok(())
    }

    /// Calendar years the date range touches, in order
    pub fn years(&self) -> Vec<i32> {
        (self.date_start.year()..=self.date_end.year()).collect()
    }

    /// Source name to reconciliation priority, for sources that set one
    pub fn priorities(&self) -> HashMap<String, i32> {
        self.sources
            .iter()
            .filter_map(|s| s.priority.map(|p| (s.name.clone(), p)))
            .collect()
    }
}
