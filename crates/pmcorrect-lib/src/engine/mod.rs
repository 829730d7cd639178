//! Correction engine
//!
//! This module implements the single-pass clustering pipeline:
//! 1. Order distinct keys by descending count, ties by ascending key
//! 2. Index every key under its k-mers
//! 3. Search candidates within the mutation budget for every key
//! 4. Assign keys to clusters in order, resolving alias chains
//! 5. Collect the cluster map

pub mod config;
pub mod corrector;
pub mod order;

pub use config::CorrectionConfig;
pub use corrector::{CorrectionSummary, Corrector};
pub use order::order_keys;
