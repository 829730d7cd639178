//! Candidate search over the k-mer index
//!
//! For a key, every other key sharing at least one k-mer is compared once
//! with the bounded Hamming distance. Keys within the mutation budget are
//! returned as candidates, closest first.

use crate::distance::bounded_hamming;
use crate::error::Result;
use crate::kmer_index::{compute_kmers, KmerIndex};
use ahash::AHashSet;

/// A key within the mutation budget of the searched key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    /// Index id of the candidate key
    pub id: usize,
    /// Hamming distance to the searched key
    pub distance: usize,
}

/// Read-only candidate search against a completed index
#[derive(Debug, Clone, Copy)]
pub struct CandidateSearch<'a> {
    index: &'a KmerIndex,
    max_mutation_sites: usize,
}

impl<'a> CandidateSearch<'a> {
    /// Create a search over `index` accepting up to `max_mutation_sites` substitutions
    pub fn new(index: &'a KmerIndex, max_mutation_sites: usize) -> Self {
        Self { index, max_mutation_sites }
    }

    /// All candidates of the key with id `id`, ordered by (distance, id)
    ///
    /// The key itself is never a candidate. The first element is the best
    /// match: minimum distance, ties to the key indexed first.
    ///
    /// # Errors
    /// Returns a length mismatch if a key sharing a k-mer has a different length
    pub fn search(&self, id: usize) -> Result<Vec<Candidate>> {
        let key = self.index.key(id);
        let mut tested = AHashSet::new();
        let mut candidates = Vec::new();

        for kmer in compute_kmers(key.as_bytes(), self.index.k()) {
            for &other in self.index.lookup(kmer) {
                // a key may show up under several of the shared k-mers
                if other == id || !tested.insert(other) {
                    continue;
                }
                let outcome = bounded_hamming(key, self.index.key(other), self.max_mutation_sites)?;
                if outcome.within_budget {
                    candidates.push(Candidate { id: other, distance: outcome.mismatches });
                }
            }
        }

        candidates.sort_unstable_by_key(|c| (c.distance, c.id));
        Ok(candidates)
    }

    /// Best candidate of the key with id `id`, if any
    ///
    /// # Errors
    /// See [`CandidateSearch::search`]
    pub fn best(&self, id: usize) -> Result<Option<Candidate>> {
        Ok(self.search(id)?.into_iter().next())
    }

    /// Mutation budget of this search
    pub fn max_mutation_sites(&self) -> usize {
        self.max_mutation_sites
    }
}
