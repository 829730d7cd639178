//! Correction configuration
//!
//! Parameters of the clustering engine and of the output collaborator,
//! validated once before any record is processed.

use crate::constants::{
    DEFAULT_KMER_LENGTH, DEFAULT_MAX_MUTATION_SITES, DEFAULT_PROGRESS_INTERVAL,
};
use crate::error::{CorrectionError, Result};

/// Configuration parameters for a correction run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectionConfig {
    /// Maximum Hamming distance between a variant and the cluster it joins
    pub max_mutation_sites: usize,

    /// K-mer length of the substring index (recommended 3 <= k <= len / (1 + m))
    pub kmer_length: usize,

    /// Sort output lines by representative key
    pub sort_output: bool,

    /// Number of threads for candidate search (0 = all available cores)
    pub num_threads: usize,

    /// Keys between two progress notifications (0 = never)
    pub progress_interval: usize,

    /// Verbose output during correction
    pub verbose: bool,
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            max_mutation_sites: DEFAULT_MAX_MUTATION_SITES,
            kmer_length: DEFAULT_KMER_LENGTH,
            sort_output: false,
            num_threads: 0,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            verbose: false,
        }
    }
}

impl CorrectionConfig {
    /// Create a configuration with the given mutation budget and k-mer length
    ///
    /// The budget is taken signed so that a negative value coming from the
    /// command line is reported as a configuration error.
    pub fn new(max_mutation_sites: i64, kmer_length: usize) -> Result<Self> {
        let max_mutation_sites = usize::try_from(max_mutation_sites).map_err(|_| {
            CorrectionError::Configuration(format!(
                "max_mutation_sites must be non-negative, got {}",
                max_mutation_sites
            ))
        })?;
        let config = Self {
            max_mutation_sites,
            kmer_length,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.kmer_length == 0 {
            return Err(CorrectionError::Configuration(
                "kmer_length must be positive, got 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Log configuration parameters via tracing
    pub fn print(&self) {
        tracing::info!("Correction Configuration:");
        tracing::info!("  max_mutation_sites = {}", self.max_mutation_sites);
        tracing::info!("  kmer_length = {}", self.kmer_length);
        if self.num_threads == 0 {
            tracing::info!("  num_threads = all available cores");
        } else {
            tracing::info!("  num_threads = {}", self.num_threads);
        }
        tracing::debug!("  sort_output = {}", self.sort_output);
        tracing::debug!("  progress_interval = {}", self.progress_interval);
        tracing::debug!("  verbose = {}", self.verbose);
    }
}
