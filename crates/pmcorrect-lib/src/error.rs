//! Error taxonomy of the correction pipeline
//!
//! Every error is fatal: the pipeline is a single-pass batch computation and
//! nothing is retried.

use thiserror::Error;

/// Error type for correction operations
#[derive(Error, Debug)]
pub enum CorrectionError {
    /// A configuration parameter is out of range
    #[error("Invalid configuration: {0}")]
    Configuration(String),
    /// Two compared keys do not have the same length
    #[error("Key length mismatch: {left:?} ({} bytes) vs {right:?} ({} bytes)", .left.len(), .right.len())]
    LengthMismatch {
        /// First compared key
        left: String,
        /// Second compared key
        right: String,
    },
    /// The count field of an input record is not a non-negative integer
    #[error("Malformed record at line {line}: count {value:?} is not a non-negative integer")]
    MalformedRecord {
        /// 1-based line number of the record
        line: usize,
        /// Offending count field
        value: String,
    },
    /// A key contains non-ASCII characters
    #[error("Key {key:?}{} is not ASCII", .line.map(|l| format!(" at line {l}")).unwrap_or_default())]
    NonAsciiKey {
        /// 1-based line number, when the key comes from an input record
        line: Option<usize>,
        /// Offending key
        key: String,
    },
    /// Adding a count would push the total count past `u64::MAX`
    #[error("Count overflow: adding to key {key:?} exceeds the maximum total count")]
    CountOverflow {
        /// Key whose count could not be added
        key: String,
    },
    /// Reading records or writing clusters failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The candidate search thread pool could not be created
    #[error("Failed to create thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, CorrectionError>;
