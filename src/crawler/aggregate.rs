//! Aggregator: cross-query deduplication and the final size bound

use crate::product::ProductRecord;
use std::collections::HashSet;

/// Deduplicates `records` by URL and keeps the first `max_results`
///
/// The first occurrence of a URL wins and input order is preserved, so
/// records from earlier queries (and earlier cards) take precedence. The
/// result is not re-sorted.
pub fn aggregate(records: Vec<ProductRecord>, max_results: usize) -> Vec<ProductRecord> {
    let mut seen = HashSet::new();

    records
        .into_iter()
        .filter(|record| seen.insert(record.url.clone()))
        .take(max_results)
        .collect()
}
