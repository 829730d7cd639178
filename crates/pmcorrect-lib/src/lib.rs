// pmcorrect: point-mutation correcting by k-mer clustering
//
// Deduplicates near-identical short strings (barcodes, UMIs) that differ by
// a few substitutions, merging each variant into the cluster of its most
// frequent neighbour while preserving counts.

#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod constants;
pub mod error;
pub mod kmer_index;
pub mod distance;
pub mod candidates;
pub mod alias;
pub mod cluster;
pub mod progress;
pub mod records;
pub mod output;
pub mod engine;

// Re-export common types at crate root
pub use error::{CorrectionError, Result};
pub use kmer_index::KmerIndex;
pub use distance::{bounded_hamming, hamming, HammingOutcome};
pub use candidates::{Candidate, CandidateSearch};
pub use alias::AliasResolver;
pub use cluster::{Cluster, ClusterMap, Member};
pub use progress::{LogProgress, NoProgress, ProgressObserver};
pub use records::{read_records, read_records_from_path, KeyCounts, Record};
pub use output::{format_cluster, write_clusters};
pub use engine::{order_keys, CorrectionConfig, CorrectionSummary, Corrector};

/// Library version reported by the `pmcorrect` binary
pub fn version() -> &'static str {
    constants::VERSION
}
