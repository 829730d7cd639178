//! Substring (k-mer) index over the distinct keys of a run
//!
//! Every key is decomposed into its overlapping k-mers, and each k-mer maps
//! to the keys containing it. Two keys of equal length that differ at `m`
//! positions always share a k-mer when `k <= len / (m + 1)`, so candidate
//! search only has to look at keys sharing a bucket instead of all pairs.
//!
//! Keys receive dense ids in insertion order. Buckets keep ids in insertion
//! order, which makes "first indexed" a well-defined tie-break.

use ahash::{AHashMap, AHashSet};

/// Compute the distinct k-mers of `key`, in order of first occurrence
///
/// A key shorter than `k` (or exactly `k` long) is its own single k-mer.
pub fn compute_kmers(key: &[u8], k: usize) -> Vec<&[u8]> {
    if key.len() <= k {
        return vec![key];
    }
    let mut seen = AHashSet::with_capacity(key.len() - k + 1);
    key.windows(k).filter(|kmer| seen.insert(*kmer)).collect()
}

/// Reverse index from k-mer to the ids of keys containing it
#[derive(Debug, Clone)]
pub struct KmerIndex {
    k: usize,
    keys: Vec<String>,
    ids: AHashMap<String, usize>,
    buckets: AHashMap<Vec<u8>, Vec<usize>>,
}

impl KmerIndex {
    /// Create an empty index with k-mer length `k` (at least 1)
    pub fn new(k: usize) -> Self {
        Self {
            k: k.max(1),
            keys: Vec::new(),
            ids: AHashMap::new(),
            buckets: AHashMap::new(),
        }
    }

    /// Build an index over `keys`, assigning ids in iteration order
    pub fn build<I, S>(k: usize, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index = Self::new(k);
        for key in keys {
            index.add(key.as_ref());
        }
        index
    }

    /// Index `key` under each of its k-mers and return its id
    ///
    /// Adding a key that is already indexed returns the existing id.
    pub fn add(&mut self, key: &str) -> usize {
        if let Some(&id) = self.ids.get(key) {
            return id;
        }
        let id = self.keys.len();
        for kmer in compute_kmers(key.as_bytes(), self.k) {
            match self.buckets.get_mut(kmer) {
                Some(bucket) => bucket.push(id),
                None => {
                    self.buckets.insert(kmer.to_vec(), vec![id]);
                }
            }
        }
        self.keys.push(key.to_string());
        self.ids.insert(key.to_string(), id);
        id
    }

    /// Ids of the keys indexed under `kmer`, in insertion order
    #[inline]
    pub fn lookup(&self, kmer: &[u8]) -> &[usize] {
        self.buckets.get(kmer).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Key with the given id
    #[inline]
    pub fn key(&self, id: usize) -> &str {
        &self.keys[id]
    }

    /// Id of an indexed key
    pub fn id_of(&self, key: &str) -> Option<usize> {
        self.ids.get(key).copied()
    }

    /// K-mer length
    pub fn k(&self) -> usize {
        self.k
    }

    /// Number of indexed keys
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True if no key has been indexed
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of distinct k-mers (buckets)
    pub fn num_kmers(&self) -> usize {
        self.buckets.len()
    }

    /// Size of the largest bucket
    pub fn max_bucket_size(&self) -> usize {
        self.buckets.values().map(Vec::len).max().unwrap_or(0)
    }
}
