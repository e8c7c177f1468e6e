//! Wells Fargo export normalizer - headerless five-column statements
//!
//! Wells Fargo account exports carry no header row; columns are
//! `date, amount, <unused>, <unused>, description`. The same format covers
//! both checking and credit card accounts, so the source label comes from
//! the configured source rather than the file.

use log::warn;

use crate::adapters::{parse_amount, parse_date};
use crate::domain::result::Result;
use crate::domain::Transaction;
use crate::ports::Normalizer;

pub struct WellsFargoNormalizer;

impl Normalizer for WellsFargoNormalizer {
    fn normalize(&self, year: i32, source: &str, raw: &[u8]) -> Result<Vec<Transaction>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(raw);

        let mut transactions = Vec::new();
        let mut skipped = 0;

        for result in reader.records() {
            let record = result?;

            let date = record.get(0).and_then(parse_date);
            let amount = record.get(1).and_then(parse_amount);
            let (date, amount) = match (date, amount) {
                (Some(d), Some(a)) => (d, a),
                _ => {
                    skipped += 1;
                    continue;
                }
            };

            let description = record.get(4).unwrap_or("").to_string();
            transactions.push(Transaction::new(date, amount, description, source, year));
        }

        if skipped > 0 {
            warn!("{}: skipped {} unparseable rows", source, skipped);
        }

        Ok(transactions)
    }
}
