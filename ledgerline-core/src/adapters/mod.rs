//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - per-format CSV normalizers for the Normalizer port
//! - filesystem and in-memory stores for the CacheStore port

pub mod fs_cache;
pub mod generic_csv;
pub mod memory_cache;
pub mod venmo;
pub mod wells_fargo;

pub use fs_cache::FsCacheStore;
pub use generic_csv::GenericCsvNormalizer;
pub use memory_cache::MemoryCacheStore;
pub use venmo::VenmoNormalizer;
pub use wells_fargo::WellsFargoNormalizer;

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::ports::NormalizerRegistry;

/// Registry with every built-in format registered
pub fn builtin_registry() -> NormalizerRegistry {
    let mut registry = NormalizerRegistry::new();
    registry.register("generic-csv", Arc::new(GenericCsvNormalizer));
    registry.register("wells-fargo", Arc::new(WellsFargoNormalizer));
    registry.register("venmo", Arc::new(VenmoNormalizer));
    registry
}

pub(crate) fn parse_date(s: &str) -> Option<NaiveDate> {
    // Try common formats
    let formats = [
        "%Y-%m-%d",
        "%m/%d/%Y",
        "%d/%m/%Y",
        "%m-%d-%Y",
        "%d-%m-%Y",
        "%Y/%m/%d",
    ];

    for fmt in &formats {
        if let Ok(date) = NaiveDate::parse_from_str(s.trim(), fmt) {
            return Some(date);
        }
    }
    None
}

pub(crate) fn parse_amount(s: &str) -> Option<Decimal> {
    let s = s.trim();

    // Handle parentheses notation for negative numbers: (100.00) -> -100.00
    let (is_negative, s) = if s.starts_with('(') && s.ends_with(')') {
        (true, &s[1..s.len() - 1])
    } else {
        (false, s)
    };

    // Remove currency symbols, commas, whitespace
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    let mut amount: Decimal = cleaned.parse().ok()?;

    // Apply parentheses negation
    if is_negative && amount > Decimal::ZERO {
        amount = -amount;
    }

    Some(amount)
}
