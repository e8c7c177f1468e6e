//! Generic CSV normalizer - headered `Date,Description,Amount` exports
//!
//! The format used for hand-maintained statements: a header row naming at
//! least Date, Description, and Amount columns, in any order.

use log::warn;

use crate::adapters::{parse_amount, parse_date};
use crate::domain::result::{Error, Result};
use crate::domain::Transaction;
use crate::ports::Normalizer;

pub struct GenericCsvNormalizer;

fn find_column(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
}

impl Normalizer for GenericCsvNormalizer {
    fn normalize(&self, year: i32, source: &str, raw: &[u8]) -> Result<Vec<Transaction>> {
        let mut reader = csv::Reader::from_reader(raw);
        let headers = reader.headers()?.clone();

        let date_idx = find_column(&headers, "date")
            .ok_or_else(|| Error::validation(format!("{}: no 'Date' column", source)))?;
        let desc_idx = find_column(&headers, "description")
            .ok_or_else(|| Error::validation(format!("{}: no 'Description' column", source)))?;
        let amount_idx = find_column(&headers, "amount")
            .ok_or_else(|| Error::validation(format!("{}: no 'Amount' column", source)))?;

        let mut transactions = Vec::new();
        let mut skipped = 0;

        for result in reader.records() {
            let record = result?;

            let date = record.get(date_idx).and_then(parse_date);
            let amount = record.get(amount_idx).and_then(parse_amount);
            let (date, amount) = match (date, amount) {
                (Some(d), Some(a)) => (d, a),
                _ => {
                    skipped += 1;
                    continue;
                }
            };

            let description = record.get(desc_idx).unwrap_or("").to_string();
            transactions.push(Transaction::new(date, amount, description, source, year));
        }

        if skipped > 0 {
            warn!("{}: skipped {} unparseable rows", source, skipped);
        }

        Ok(transactions)
    }
}
