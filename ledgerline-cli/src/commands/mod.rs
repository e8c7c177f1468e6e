//! CLI command implementations

pub mod cache;
pub mod formats;
pub mod report;
pub mod rules;
