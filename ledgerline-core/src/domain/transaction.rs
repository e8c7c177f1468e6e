//! Transaction domain model

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A single normalized financial transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub amount: Decimal,
    /// Description exactly as the source reported it
    pub description: String,
    /// Label of the originating data source
    pub source: String,
    /// Filing period: the statement year this record arrived under.
    /// May differ from `date.year()` near year boundaries.
    pub year: i32,
    /// Dedup identity: hash of date, amount, and normalized description
    pub raw_key: String,
    /// Assigned by the categorizer; `None` until then
    pub category: Option<String>,
    pub supercategory: Option<String>,
    pub group: Option<String>,
    /// Filled by the reconciler when another source reported the same
    /// transaction and this record won
    pub alt_source: Option<String>,
    pub alt_source_description: Option<String>,
}

impl Transaction {
    /// Create a new transaction; the dedup key is computed up front
    pub fn new(
        date: NaiveDate,
        amount: Decimal,
        description: impl Into<String>,
        source: impl Into<String>,
        year: i32,
    ) -> Self {
        let description = description.into();
        let raw_key = Self::calculate_raw_key(&date, &amount, &description);
        Self {
            date,
            amount,
            description,
            source: source.into(),
            year,
            raw_key,
            category: None,
            supercategory: None,
            group: None,
            alt_source: None,
            alt_source_description: None,
        }
    }

    /// Calculate the dedup key for this transaction
    ///
    /// Uses: date, amount (with sign), and normalized description. The source
    /// is deliberately excluded so the same transaction reported by two
    /// sources hashes identically.
    ///
    /// Description normalization handles export format differences:
    /// - Removes literal "null" strings (CSV exports)
    /// - Removes card number masks (XXXXXXXXXXXX1234)
    /// - Normalizes account/phone numbers to last 4 digits
    /// - Removes whitespace and special characters
    pub fn calculate_raw_key(date: &NaiveDate, amount: &Decimal, description: &str) -> String {
        let date_str = date.format("%Y-%m-%d").to_string();

        // Normalize amount: treat -0 as 0
        let amount = if *amount == Decimal::ZERO {
            Decimal::ZERO.abs()
        } else {
            *amount
        };
        let amount_normalized = format!("{:.2}", amount);

        let desc_normalized = Self::normalize_description(description);

        let key_str = format!("{}|{}|{}", date_str, amount_normalized, desc_normalized);

        // SHA256 hash, truncated to 16 chars
        let mut hasher = Sha256::new();
        hasher.update(key_str.as_bytes());
        let result = hasher.finalize();
        hex::encode(&result[..8])
    }

    /// Normalize description for dedup comparison
    fn normalize_description(desc: &str) -> String {
        let desc = desc.to_lowercase();

        // Remove literal "null" strings (common in CSV exports)
        let null_re = Regex::new(r"\bnull\b").unwrap();
        let mut normalized = null_re.replace_all(&desc, "").to_string();

        // Remove card number masks (10+ X's followed by 4 digits)
        let card_mask_re = Regex::new(r"x{10,}\d{4}").unwrap();
        normalized = card_mask_re.replace_all(&normalized, "").to_string();

        // Normalize phone/account numbers (7-12 chars of X's and digits)
        // Keep only last 4 digits
        let account_re = Regex::new(r"[x0-9]{7,12}").unwrap();
        normalized = account_re
            .replace_all(&normalized, |caps: &regex::Captures| {
                let text = caps.get(0).unwrap().as_str();
                let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
                if digits.len() >= 4 {
                    digits[digits.len() - 4..].to_string()
                } else {
                    text.to_string()
                }
            })
            .to_string();

        // Remove whitespace
        let whitespace_re = Regex::new(r"\s+").unwrap();
        normalized = whitespace_re.replace_all(&normalized, "").to_string();

        // Remove all special characters, keep only alphanumeric
        let special_re = Regex::new(r"[^a-z0-9]").unwrap();
        special_re.replace_all(&normalized, "").to_string()
    }
}
