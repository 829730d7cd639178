//! Correction engine orchestration
//!
//! Coordinates the single pass that turns aggregated key counts into
//! clusters:
//! 1. Order keys by descending count
//! 2. Index all keys under their k-mers
//! 3. Search candidates for every key (read-only, optionally parallel)
//! 4. Commit cluster assignments serially in key order
//! 5. Collect the cluster map

use crate::{
    alias::{AliasResolver, KeyState},
    candidates::{Candidate, CandidateSearch},
    cluster::ClusterMap,
    constants::{is_recommended_k, max_recommended_k, MIN_RECOMMENDED_K},
    engine::{config::CorrectionConfig, order::order_keys},
    error::Result,
    kmer_index::KmerIndex,
    progress::{NoProgress, ProgressObserver},
    records::KeyCounts,
};
use rayon::prelude::*;
use tracing::{debug, info, warn};

/// Counts describing the outcome of a correction run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CorrectionSummary {
    /// Distinct input keys
    pub num_keys: usize,
    /// Clusters produced
    pub num_clusters: usize,
    /// Keys merged into another key's cluster
    pub num_merged: usize,
    /// Sum of all counts
    pub total_count: u64,
}

impl CorrectionSummary {
    /// Summarize a cluster map
    pub fn from_clusters(clusters: &ClusterMap) -> Self {
        let num_keys = clusters.num_keys();
        let num_clusters = clusters.len();
        Self {
            num_keys,
            num_clusters,
            num_merged: num_keys - num_clusters,
            total_count: clusters.total(),
        }
    }

    /// Log the summary via tracing
    pub fn print(&self) {
        info!("Correction Summary:");
        info!("  Distinct keys: {}", self.num_keys);
        info!("  Clusters: {}", self.num_clusters);
        info!(
            "  Merged keys: {} ({:.2}%)",
            self.num_merged,
            if self.num_keys == 0 { 0.0 } else { self.num_merged as f64 * 100.0 / self.num_keys as f64 }
        );
        info!("  Total count: {}", self.total_count);
    }
}

/// Greedy, count-ordered clustering of near-identical keys
pub struct Corrector {
    config: CorrectionConfig,
}

impl Corrector {
    /// Create a new corrector with the given configuration
    pub fn new(config: CorrectionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration of this corrector
    pub fn config(&self) -> &CorrectionConfig {
        &self.config
    }

    /// Cluster the aggregated counts
    ///
    /// # Errors
    /// Returns a length mismatch if two keys sharing a k-mer differ in length,
    /// or a thread pool error if the candidate search pool cannot be built
    pub fn correct(&self, counts: &KeyCounts) -> Result<ClusterMap> {
        self.correct_with_progress(counts, &mut NoProgress)
    }

    /// Cluster the aggregated counts, notifying `progress` during assignment
    ///
    /// # Errors
    /// See [`Corrector::correct`]
    pub fn correct_with_progress<P>(&self, counts: &KeyCounts, progress: &mut P) -> Result<ClusterMap>
    where
        P: ProgressObserver + ?Sized,
    {
        if self.config.verbose {
            self.config.print();
        }
        info!("Correcting {} distinct keys (total count {})", counts.len(), counts.total());

        let ordered = order_keys(counts);
        let clusters = if self.config.max_mutation_sites == 0 {
            info!("  Mutation budget is 0: every key is its own cluster");
            self.singletons(&ordered, progress)
        } else {
            self.cluster(&ordered, progress)?
        };

        CorrectionSummary::from_clusters(&clusters).print();
        Ok(clusters)
    }

    /// One cluster per key, without indexing or comparison
    fn singletons<P>(&self, ordered: &[(String, u64)], progress: &mut P) -> ClusterMap
    where
        P: ProgressObserver + ?Sized,
    {
        let mut clusters = ClusterMap::new();
        for (i, (key, count)) in ordered.iter().enumerate() {
            clusters.credit(key, key, *count);
            self.tick(progress, i + 1, ordered.len());
        }
        progress.on_finish(ordered.len());
        clusters
    }

    fn cluster<P>(&self, ordered: &[(String, u64)], progress: &mut P) -> Result<ClusterMap>
    where
        P: ProgressObserver + ?Sized,
    {
        let k = self.config.kmer_length;

        info!("Step 1: Indexing keys (k = {})...", k);
        let index = KmerIndex::build(k, ordered.iter().map(|(key, _)| key.as_str()));
        info!("  Indexed {} keys under {} k-mers", index.len(), index.num_kmers());
        debug!("  Largest bucket: {} keys", index.max_bucket_size());
        self.check_kmer_length(ordered);

        info!("Step 2: Searching candidates...");
        let candidates = self.search_all(&index)?;
        debug!(
            "  {} candidate pairs within {} mutation sites",
            candidates.iter().map(Vec::len).sum::<usize>(),
            self.config.max_mutation_sites
        );

        info!("Step 3: Assigning keys to clusters...");
        let mut assignment = Assignment::new(index.len());
        let mut merged = 0usize;
        for (id, (key, count)) in ordered.iter().enumerate() {
            if let Step::Merged { into } = assignment.assign(id, *count, &candidates[id]) {
                if merged < 10 {
                    debug!("  {} -> {}", key, index.key(into));
                }
                merged += 1;
            }
            self.tick(progress, id + 1, ordered.len());
        }
        progress.on_finish(ordered.len());
        if merged > 10 {
            debug!("  ... (showing first 10 merges)");
        }

        Ok(assignment.into_clusters(&index))
    }

    /// Candidate lists of all indexed keys, by key id
    ///
    /// The number of threads is controlled by `config.num_threads`:
    /// - `0`: all available CPU cores (rayon default)
    /// - `1`: single-threaded, no pool
    /// - `N`: exactly N threads
    fn search_all(&self, index: &KmerIndex) -> Result<Vec<Vec<Candidate>>> {
        let search = CandidateSearch::new(index, self.config.max_mutation_sites);
        if self.config.num_threads == 1 {
            return (0..index.len()).map(|id| search.search(id)).collect();
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.num_threads)
            .build()?;
        pool.install(|| {
            (0..index.len())
                .into_par_iter()
                .map(|id| search.search(id))
                .collect()
        })
    }

    /// Warn when k cannot guarantee a shared k-mer between close keys
    fn check_kmer_length(&self, ordered: &[(String, u64)]) {
        let Some(len) = ordered.iter().map(|(key, _)| key.len()).min() else {
            return;
        };
        if let Some(message) =
            kmer_length_warning(self.config.kmer_length, len, self.config.max_mutation_sites)
        {
            warn!("{}; variants may be missed", message);
        }
    }

    fn tick<P>(&self, progress: &mut P, processed: usize, total: usize)
    where
        P: ProgressObserver + ?Sized,
    {
        let interval = self.config.progress_interval;
        if interval > 0 && processed % interval == 0 {
            progress.on_progress(processed, total);
        }
    }
}

/// What the assignment pass did with a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Credited to the cluster it is canonical for
    Canonical,
    /// Credited to the cluster it was merged into earlier
    Alias,
    /// Started a new cluster
    NewCluster,
    /// Merged into the cluster rooted at `into`
    Merged { into: usize },
}

/// Mutable state of the assignment pass
struct Assignment {
    resolver: AliasResolver,
    contributed: Vec<u64>,
}

impl Assignment {
    fn new(num_keys: usize) -> Self {
        Self {
            resolver: AliasResolver::new(num_keys),
            contributed: vec![0; num_keys],
        }
    }

    /// Assign key `id` carrying `count`, given its candidates in (distance, id) order
    ///
    /// Only candidates that already belong to a cluster can be joined; the
    /// first of them is the closest one, ties to the key indexed first.
    fn assign(&mut self, id: usize, count: u64, candidates: &[Candidate]) -> Step {
        self.contributed[id] += count;
        match self.resolver.state(id) {
            KeyState::Canonical => {
                self.resolver.credit(id, count);
                Step::Canonical
            }
            KeyState::Alias => {
                self.resolver.credit(id, count);
                Step::Alias
            }
            KeyState::Unvisited => {
                match candidates.iter().find(|c| self.resolver.is_resolved(c.id)) {
                    None => {
                        self.resolver.make_canonical(id, count);
                        Step::NewCluster
                    }
                    Some(best) => {
                        let into = self.resolver.merge(id, count, best.id);
                        Step::Merged { into }
                    }
                }
            }
        }
    }

    /// Group every assigned key under its root, in key order
    fn into_clusters(mut self, index: &KmerIndex) -> ClusterMap {
        let mut clusters = ClusterMap::new();
        for id in 0..self.contributed.len() {
            if !self.resolver.is_resolved(id) {
                continue;
            }
            let root = self.resolver.find(id);
            clusters.credit(index.key(root), index.key(id), self.contributed[id]);
        }
        clusters
    }
}

/// Describe why `k` is not recommended for keys of length `len`, if it is not
fn kmer_length_warning(k: usize, len: usize, max_mutation_sites: usize) -> Option<String> {
    if is_recommended_k(k, len, max_mutation_sites) {
        return None;
    }
    let max_k = max_recommended_k(len, max_mutation_sites);
    if max_k < MIN_RECOMMENDED_K {
        Some(format!(
            "keys of length {} are too short for any recommended k-mer length at {} mutation \
             sites (k-mer length {} in use)",
            len, max_mutation_sites, k
        ))
    } else {
        Some(format!(
            "k-mer length {} is outside the recommended range [{}, {}] for keys of length {} \
             and {} mutation sites",
            k, MIN_RECOMMENDED_K, max_k, len, max_mutation_sites
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CorrectionError;
    use crate::output::format_cluster;

    fn corrector(max_mutation_sites: i64, k: usize) -> Corrector {
        let mut config = CorrectionConfig::new(max_mutation_sites, k).unwrap();
        config.num_threads = 1;
        Corrector::new(config).unwrap()
    }

    fn lines(clusters: &ClusterMap) -> Vec<String> {
        clusters.iter().map(format_cluster).collect()
    }

    #[test]
    fn test_kmer_length_warning() {
        assert_eq!(kmer_length_warning(3, 12, 1), None);
        assert_eq!(
            kmer_length_warning(9, 12, 1).unwrap(),
            "k-mer length 9 is outside the recommended range [3, 6] for keys of length 12 \
             and 1 mutation sites"
        );
        // 4-character keys at m = 1 leave no recommended k at all
        let message = kmer_length_warning(2, 4, 1).unwrap();
        assert_eq!(
            message,
            "keys of length 4 are too short for any recommended k-mer length at 1 mutation \
             sites (k-mer length 2 in use)"
        );
        assert!(!message.contains("[3, 2]"));
    }

    #[test]
    fn test_corrector_invalid_config() {
        let config = CorrectionConfig { kmer_length: 0, ..CorrectionConfig::default() };
        assert!(Corrector::new(config).is_err());
    }

    #[test]
    fn test_merges_single_substitution() {
        let counts = KeyCounts::from_pairs([("AAAA", 5), ("AAAT", 2), ("TTTT", 3)]).unwrap();
        let clusters = corrector(1, 2).correct(&counts).unwrap();

        assert_eq!(
            lines(&clusters),
            vec!["AAAA\t7\t{AAAA: 5, AAAT: 2}", "TTTT\t3\t{TTTT: 3}"]
        );
        assert_eq!(clusters.root_of("AAAT"), Some("AAAA"));
    }

    #[test]
    fn test_zero_budget_keeps_singletons() {
        let counts = KeyCounts::from_pairs([("AAAA", 5), ("AAAT", 2), ("TTTT", 3)]).unwrap();
        let clusters = corrector(0, 2).correct(&counts).unwrap();

        assert_eq!(clusters.len(), 3);
        assert!(clusters.iter().all(|c| c.len() == 1));
        assert_eq!(clusters.get("AAAT").unwrap().total(), 2);
    }

    #[test]
    fn test_zero_budget_skips_length_check() {
        let counts = KeyCounts::from_pairs([("AAAA", 2), ("AAA", 1)]).unwrap();
        let clusters = corrector(0, 2).correct(&counts).unwrap();
        assert_eq!(clusters.len(), 2);
    }

    #[test]
    fn test_length_mismatch_aborts() {
        let counts = KeyCounts::from_pairs([("AAAA", 2), ("AAA", 1)]).unwrap();
        let err = corrector(1, 2).correct(&counts).unwrap_err();
        assert!(matches!(err, CorrectionError::LengthMismatch { .. }));
    }

    #[test]
    fn test_empty_input() {
        let clusters = corrector(1, 9).correct(&KeyCounts::new()).unwrap();
        assert!(clusters.is_empty());
    }

    #[test]
    fn test_alias_candidate_resolves_to_root() {
        let counts = KeyCounts::from_pairs([("AAAAAA", 10), ("AAAAAT", 5), ("AAAATT", 2)]).unwrap();
        let clusters = corrector(1, 2).correct(&counts).unwrap();

        // AAAATT is two substitutions from AAAAAA but joins through AAAAAT
        assert_eq!(clusters.len(), 1);
        assert_eq!(
            lines(&clusters),
            vec!["AAAAAA\t17\t{AAAAAA: 10, AAAAAT: 5, AAAATT: 2}"]
        );
    }

    #[test]
    fn test_closest_cluster_wins() {
        // AAAATT is 2 from AAAAAA but 1 from AAATTT
        let counts = KeyCounts::from_pairs([("AAAAAA", 10), ("AAATTT", 9), ("AAAATT", 1)]).unwrap();
        let clusters = corrector(2, 2).correct(&counts).unwrap();

        assert_eq!(clusters.root_of("AAAATT"), Some("AAATTT"));
        assert_eq!(clusters.get("AAAAAA").unwrap().len(), 1);
    }

    #[test]
    fn test_tie_goes_to_first_visited_cluster() {
        // AAAG and GAAA have equal counts; AAAG sorts first
        let counts = KeyCounts::from_pairs([("GAAA", 5), ("AAAG", 5), ("AAAA", 1)]).unwrap();
        let clusters = corrector(1, 2).correct(&counts).unwrap();

        assert_eq!(
            lines(&clusters),
            vec!["AAAG\t6\t{AAAG: 5, AAAA: 1}", "GAAA\t5\t{GAAA: 5}"]
        );
    }

    #[test]
    fn test_unvisited_candidates_do_not_absorb_frequent_keys() {
        let counts = KeyCounts::from_pairs([("AAAA", 10), ("TTTT", 9), ("TTTA", 1)]).unwrap();
        let clusters = corrector(1, 2).correct(&counts).unwrap();

        assert_eq!(
            lines(&clusters),
            vec!["AAAA\t10\t{AAAA: 10}", "TTTT\t10\t{TTTT: 9, TTTA: 1}"]
        );
    }

    #[test]
    fn test_thread_count_does_not_change_result() {
        let bases = ['A', 'C', 'G', 'T'];
        let mut counts = KeyCounts::new();
        for (i, &a) in bases.iter().enumerate() {
            for (j, &b) in bases.iter().enumerate() {
                let center = format!("{a}{b}ACGTAC{b}{a}");
                counts.add(center.clone(), 100 + (i * 4 + j) as u64).unwrap();
                for pos in 0..center.len() {
                    let mut variant: Vec<char> = center.chars().collect();
                    variant[pos] = if variant[pos] == 'A' { 'C' } else { 'A' };
                    let variant: String = variant.into_iter().collect();
                    counts.add(variant, 1 + (pos % 3) as u64).unwrap();
                }
            }
        }

        let sequential = corrector(1, 3).correct(&counts).unwrap();
        let mut config = CorrectionConfig::new(1, 3).unwrap();
        config.num_threads = 4;
        let parallel = Corrector::new(config).unwrap().correct(&counts).unwrap();

        assert_eq!(lines(&sequential), lines(&parallel));
        assert_eq!(sequential.total(), counts.total());
    }

    #[test]
    fn test_progress_cadence() {
        let counts = KeyCounts::from_pairs([
            ("AAAA", 5),
            ("CCCC", 4),
            ("GGGG", 3),
            ("TTTT", 2),
            ("ACGT", 1),
        ])
        .unwrap();
        let mut config = CorrectionConfig::new(1, 2).unwrap();
        config.num_threads = 1;
        config.progress_interval = 2;
        let corrector = Corrector::new(config).unwrap();

        let mut ticks = Vec::new();
        corrector
            .correct_with_progress(&counts, &mut |processed: usize, total: usize| {
                ticks.push((processed, total))
            })
            .unwrap();
        assert_eq!(ticks, vec![(2, 5), (4, 5)]);
    }

    #[test]
    fn test_summary() {
        let counts = KeyCounts::from_pairs([("AAAA", 5), ("AAAT", 2), ("TTTT", 3)]).unwrap();
        let clusters = corrector(1, 2).correct(&counts).unwrap();
        let summary = CorrectionSummary::from_clusters(&clusters);
        assert_eq!(
            summary,
            CorrectionSummary { num_keys: 3, num_clusters: 2, num_merged: 1, total_count: 10 }
        );
    }

    #[test]
    fn test_assignment_revisits_resolved_keys() {
        let index = KmerIndex::build(2, ["AAAA", "AAAT"]);
        let mut assignment = Assignment::new(index.len());

        assert_eq!(assignment.assign(0, 5, &[]), Step::NewCluster);
        let to_first = [Candidate { id: 0, distance: 1 }];
        assert_eq!(assignment.assign(1, 1, &to_first), Step::Merged { into: 0 });

        // a key decided earlier is credited without a new search
        assert_eq!(assignment.assign(0, 2, &[]), Step::Canonical);
        assert_eq!(assignment.assign(1, 3, &[]), Step::Alias);

        let clusters = assignment.into_clusters(&index);
        assert_eq!(lines(&clusters), vec!["AAAA\t11\t{AAAA: 7, AAAT: 4}"]);
    }

    #[test]
    fn test_assignment_skips_unresolved_candidates() {
        let index = KmerIndex::build(2, ["AAAA", "AAAT", "AATT"]);
        let mut assignment = Assignment::new(index.len());

        let candidates = [Candidate { id: 2, distance: 1 }];
        assert_eq!(assignment.assign(1, 4, &candidates), Step::NewCluster);
    }
}
