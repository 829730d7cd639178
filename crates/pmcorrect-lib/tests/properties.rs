//! Property tests for the correction engine

use pmcorrect_lib::{hamming, AliasResolver, CorrectionConfig, Corrector, KeyCounts};
use proptest::prelude::*;

/// Records over a two-letter alphabet so that close variants are common
fn records() -> impl Strategy<Value = Vec<(String, u64)>> {
    prop::collection::vec(("[AC]{6}", 0u64..50), 1..60)
}

fn corrector(max_mutation_sites: usize, k: usize) -> Corrector {
    let mut config = CorrectionConfig::new(max_mutation_sites as i64, k).unwrap();
    config.num_threads = 1;
    Corrector::new(config).unwrap()
}

proptest! {
    #[test]
    fn prop_conservation(records in records(), m in 0usize..=2, k in 1usize..=4) {
        let counts = KeyCounts::from_pairs(records.iter().cloned()).unwrap();
        let clusters = corrector(m, k).correct(&counts).unwrap();

        let input_total: u64 = records.iter().map(|(_, c)| c).sum();
        prop_assert_eq!(clusters.total(), input_total);
        prop_assert_eq!(clusters.num_keys(), counts.len());
        // every key lands in exactly one cluster
        for (key, count) in counts.iter() {
            let cluster = clusters.cluster_of(key);
            prop_assert!(cluster.is_some());
            prop_assert_eq!(cluster.unwrap().count_of(key), Some(count));
        }
    }

    #[test]
    fn prop_zero_budget_partition(records in records(), k in 1usize..=4) {
        let counts = KeyCounts::from_pairs(records).unwrap();
        let clusters = corrector(0, k).correct(&counts).unwrap();

        prop_assert_eq!(clusters.len(), counts.len());
        for cluster in &clusters {
            prop_assert_eq!(cluster.len(), 1);
            prop_assert_eq!(Some(cluster.total()), counts.get(cluster.canonical()));
        }
    }

    #[test]
    fn prop_members_join_through_close_neighbours(records in records(), m in 1usize..=2) {
        let counts = KeyCounts::from_pairs(records).unwrap();
        let clusters = corrector(m, 6 / (m + 1)).correct(&counts).unwrap();

        for cluster in &clusters {
            let members = cluster.members();
            prop_assert_eq!(members[0].key.as_str(), cluster.canonical());
            for (i, member) in members.iter().enumerate().skip(1) {
                let linked = members[..i]
                    .iter()
                    .any(|earlier| hamming(&earlier.key, &member.key).unwrap() <= m);
                prop_assert!(linked, "{} has no close earlier member", member.key);
            }
        }
    }

    #[test]
    fn prop_representatives_are_stable(records in records(), m in 1usize..=2) {
        // with k <= len / (m + 1) every pair within m shares a k-mer
        let k = 6 / (m + 1);
        let counts = KeyCounts::from_pairs(records).unwrap();
        let clusters = corrector(m, k).correct(&counts).unwrap();

        let representatives = KeyCounts::from_pairs(
            clusters.iter().map(|c| (c.representative().to_string(), c.total())),
        )
        .unwrap();
        let again = corrector(m, k).correct(&representatives).unwrap();

        prop_assert_eq!(again.len(), clusters.len());
        prop_assert!(again.iter().all(|c| c.len() == 1));
    }

    #[test]
    fn prop_alias_chains_terminate(
        counts in prop::collection::vec(0u64..20, 1..40),
        targets in prop::collection::vec(any::<prop::sample::Index>(), 40),
    ) {
        let n = counts.len();
        let mut resolver = AliasResolver::new(n);
        resolver.make_canonical(0, counts[0]);
        for id in 1..n {
            // merge into any earlier key, or start a new cluster every third key
            if id % 3 == 0 {
                resolver.make_canonical(id, counts[id]);
            } else {
                let target = targets[id].index(id);
                resolver.merge(id, counts[id], target);
            }
        }

        let total: u64 = counts.iter().sum();
        let mut root_total = 0;
        for id in 0..n {
            prop_assert!(resolver.chain_length(id) < n);
            let root = resolver.root_of(id);
            prop_assert!(resolver.is_canonical(root));
            if root == id {
                root_total += resolver.weight(id);
            }
        }
        prop_assert_eq!(root_total, total);
    }
}
