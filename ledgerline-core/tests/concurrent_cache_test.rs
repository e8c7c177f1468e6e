//! Concurrent normalization cache tests
//!
//! Verifies that when several threads request the same (year, source,
//! fingerprint) at once, the normalizer runs exactly once and every caller
//! gets the same records.
//!
//! Run with: cargo test --test concurrent_cache_test -- --nocapture

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use ledgerline_core::adapters::MemoryCacheStore;
use ledgerline_core::domain::result::Result;
use ledgerline_core::domain::Transaction;
use ledgerline_core::ports::Normalizer;
use ledgerline_core::services::NormalizationCache;

/// Number of concurrent threads. Keep this realistic - a reporting run
/// normalizes at most a handful of files in parallel.
const THREAD_COUNT: usize = 6;

/// Normalizer that counts invocations and is deliberately slow, to widen
/// the window in which a second thread could start a redundant computation
struct SlowCountingNormalizer {
    calls: AtomicUsize,
}

impl Normalizer for SlowCountingNormalizer {
    fn normalize(&self, year: i32, source: &str, _raw: &[u8]) -> Result<Vec<Transaction>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(50));
        Ok(vec![Transaction::new(
            NaiveDate::from_ymd_opt(year, 1, 1).unwrap(),
            dec!(-1.00),
            "SLOW RECORD",
            source,
            year,
        )])
    }
}

#[test]
fn test_same_key_computes_exactly_once() {
    let cache = Arc::new(NormalizationCache::new(Arc::new(MemoryCacheStore::new())));
    let normalizer = Arc::new(SlowCountingNormalizer {
        calls: AtomicUsize::new(0),
    });
    let barrier = Arc::new(Barrier::new(THREAD_COUNT));

    let mut handles = vec![];
    for _ in 0..THREAD_COUNT {
        let cache = Arc::clone(&cache);
        let normalizer = Arc::clone(&normalizer);
        let barrier = Arc::clone(&barrier);

        handles.push(thread::spawn(move || {
            barrier.wait();
            cache
                .get_or_compute(2024, "bank", b"same raw bytes", normalizer.as_ref())
                .unwrap()
        }));
    }

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(normalizer.calls.load(Ordering::SeqCst), 1);
    for records in &results {
        assert_eq!(records, &results[0]);
    }
}

#[test]
fn test_distinct_keys_do_not_serialize_on_each_other() {
    let cache = Arc::new(NormalizationCache::new(Arc::new(MemoryCacheStore::new())));
    let normalizer = Arc::new(SlowCountingNormalizer {
        calls: AtomicUsize::new(0),
    });
    let barrier = Arc::new(Barrier::new(THREAD_COUNT));

    let mut handles = vec![];
    for thread_id in 0..THREAD_COUNT {
        let cache = Arc::clone(&cache);
        let normalizer = Arc::clone(&normalizer);
        let barrier = Arc::clone(&barrier);

        handles.push(thread::spawn(move || {
            barrier.wait();
            let raw = format!("file contents {}", thread_id);
            cache
                .get_or_compute(2024, "bank", raw.as_bytes(), normalizer.as_ref())
                .unwrap()
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    // Different fingerprints are independent units of work
    assert_eq!(normalizer.calls.load(Ordering::SeqCst), THREAD_COUNT);
}
