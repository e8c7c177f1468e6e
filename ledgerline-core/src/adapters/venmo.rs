//! Venmo statement normalizer
//!
//! Venmo CSV exports put two preamble lines above the header row, leave the
//! first data row blank, and close with a balance-only row. Amounts look
//! like `$ 1,234.56`. Descriptions are synthesized as `(From->To) Note`;
//! cash-outs to a bank account arrive as `Standard Transfer` rows and are
//! renamed `Venmo Cashout` so they match the bank side of the transfer.

use chrono::{NaiveDate, NaiveDateTime};
use log::debug;

use crate::adapters::{parse_amount, parse_date};
use crate::domain::result::{Error, Result};
use crate::domain::Transaction;
use crate::ports::Normalizer;

pub struct VenmoNormalizer;

fn parse_venmo_datetime(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    parse_date(s)
}

fn find_column(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
}

impl Normalizer for VenmoNormalizer {
    fn normalize(&self, year: i32, source: &str, raw: &[u8]) -> Result<Vec<Transaction>> {
        let text = std::str::from_utf8(raw)
            .map_err(|_| Error::validation(format!("{}: statement is not UTF-8", source)))?;

        // Header sits on the third line; everything above it is preamble
        let body = text.lines().skip(2).collect::<Vec<_>>().join("\n");
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(body.as_bytes());
        let headers = reader.headers()?.clone();

        let date_idx = find_column(&headers, "datetime")
            .ok_or_else(|| Error::validation(format!("{}: no 'Datetime' column", source)))?;
        let type_idx = find_column(&headers, "type")
            .ok_or_else(|| Error::validation(format!("{}: no 'Type' column", source)))?;
        let amount_idx = find_column(&headers, "amount (total)")
            .ok_or_else(|| Error::validation(format!("{}: no 'Amount (total)' column", source)))?;
        let note_idx = find_column(&headers, "note");
        let from_idx = find_column(&headers, "from");
        let to_idx = find_column(&headers, "to");

        let mut transactions = Vec::new();
        let mut skipped = 0;

        for result in reader.records() {
            let record = result?;

            let date = record.get(date_idx).and_then(parse_venmo_datetime);
            let amount = record.get(amount_idx).and_then(parse_amount);
            let (date, amount) = match (date, amount) {
                (Some(d), Some(a)) => (d, a),
                // The leading blank row and the trailing balance row land here
                _ => {
                    skipped += 1;
                    continue;
                }
            };

            let get = |idx: Option<usize>| idx.and_then(|i| record.get(i)).unwrap_or("");
            let description = if get(Some(type_idx)) == "Standard Transfer" {
                "Venmo Cashout".to_string()
            } else {
                format!(
                    "({}->{}) {}",
                    get(from_idx),
                    get(to_idx),
                    get(note_idx)
                )
            };

            transactions.push(Transaction::new(date, amount, description, source, year));
        }

        debug!("{}: skipped {} non-transaction rows", source, skipped);
        Ok(transactions)
    }
}
