//! Bounded Hamming distance between equal-length keys
//!
//! Only substitutions are considered. Keys of different length cannot be
//! compared and yield [`CorrectionError::LengthMismatch`].

use crate::error::{CorrectionError, Result};

/// Outcome of a bounded comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HammingOutcome {
    /// True if the keys differ at no more than `budget` positions
    pub within_budget: bool,
    /// Mismatches counted before the scan stopped
    ///
    /// Exact when `within_budget` is true, `budget + 1` otherwise.
    pub mismatches: usize,
}

/// Count mismatching positions of `a` and `b`, stopping once `budget` is exceeded
///
/// # Errors
/// Returns [`CorrectionError::LengthMismatch`] if the keys differ in length
pub fn bounded_hamming(a: &str, b: &str, budget: usize) -> Result<HammingOutcome> {
    let (x, y) = (a.as_bytes(), b.as_bytes());
    if x.len() != y.len() {
        return Err(CorrectionError::LengthMismatch {
            left: a.to_string(),
            right: b.to_string(),
        });
    }

    let mut mismatches = 0;
    for (l, r) in x.iter().zip(y) {
        if l != r {
            mismatches += 1;
            if mismatches > budget {
                return Ok(HammingOutcome { within_budget: false, mismatches });
            }
        }
    }
    Ok(HammingOutcome { within_budget: true, mismatches })
}

/// Full Hamming distance of two equal-length keys
///
/// # Errors
/// Returns [`CorrectionError::LengthMismatch`] if the keys differ in length
pub fn hamming(a: &str, b: &str) -> Result<usize> {
    bounded_hamming(a, b, usize::MAX).map(|outcome| outcome.mismatches)
}
