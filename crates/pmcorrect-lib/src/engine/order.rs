//! Processing order of the correction pass
//!
//! Frequent keys are assumed unmutated, so they are visited first and become
//! cluster centers before their rare variants are seen.

use crate::records::KeyCounts;
use std::cmp::Reverse;

/// Distinct keys ordered by descending count, ties by ascending key
pub fn order_keys(counts: &KeyCounts) -> Vec<(String, u64)> {
    let mut ordered: Vec<(String, u64)> = counts
        .iter()
        .map(|(key, count)| (key.to_string(), count))
        .collect();
    ordered.sort_unstable_by(|a, b| (Reverse(a.1), &a.0).cmp(&(Reverse(b.1), &b.0)));
    ordered
}
