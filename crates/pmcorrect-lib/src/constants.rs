//! Constants and defaults for point-mutation correcting
//!
//! This module defines the default parameters of the correction engine
//! and the recommended k-mer length range.

/// Default maximum number of substitutions between a variant and its cluster
pub const DEFAULT_MAX_MUTATION_SITES: usize = 1;

/// Default k-mer length for the substring index
pub const DEFAULT_KMER_LENGTH: usize = 9;

/// Smallest recommended k-mer length
///
/// Shorter k-mers are accepted but make index buckets large, so candidate
/// search degrades toward all-pairs comparison.
pub const MIN_RECOMMENDED_K: usize = 3;

/// Number of keys between two progress notifications
pub const DEFAULT_PROGRESS_INTERVAL: usize = 10_000;

/// Count credited to a record without an explicit count field
pub const DEFAULT_RECORD_COUNT: u64 = 1;

/// Crate version, as declared in the package manifest
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Largest k-mer length that still guarantees a shared k-mer between two keys
/// of length `len` differing at `max_mutation_sites` positions.
///
/// `m` substitutions split a key into at most `m + 1` untouched runs, and the
/// longest of them has at least `len / (m + 1)` characters.
#[inline]
pub const fn max_recommended_k(len: usize, max_mutation_sites: usize) -> usize {
    len / (1 + max_mutation_sites)
}

/// Check if a k-mer length is in the recommended range for keys of length `len`
#[inline]
pub const fn is_recommended_k(k: usize, len: usize, max_mutation_sites: usize) -> bool {
    k >= MIN_RECOMMENDED_K && k <= max_recommended_k(len, max_mutation_sites)
}
