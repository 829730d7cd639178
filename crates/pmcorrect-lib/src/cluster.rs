//! Clusters produced by the correction engine
//!
//! A cluster is identified by its canonical key and records how much each
//! member key contributed. Members are kept in the order the engine visited
//! them, which is the tie-break for consensus selection.

use ahash::AHashMap;

/// A key and the count it contributed to its cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Member key
    pub key: String,
    /// Aggregated count contributed by the key
    pub count: u64,
}

/// A group of keys merged into one canonical key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    canonical: String,
    members: Vec<Member>,
}

impl Cluster {
    fn new(canonical: &str) -> Self {
        Self { canonical: canonical.to_string(), members: Vec::new() }
    }

    /// Canonical key used as the cluster identity
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Members in visit order
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Number of member keys
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// True if the cluster has no member
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Sum of all member counts
    pub fn total(&self) -> u64 {
        self.members.iter().map(|m| m.count).sum()
    }

    /// Count contributed by `key`, if it is a member
    pub fn count_of(&self, key: &str) -> Option<u64> {
        self.members.iter().find(|m| m.key == key).map(|m| m.count)
    }

    /// Consensus key: the member with the highest count
    ///
    /// Ties go to the member visited first.
    pub fn representative(&self) -> &str {
        let mut best: Option<&Member> = None;
        for member in &self.members {
            if best.map_or(true, |b| member.count > b.count) {
                best = Some(member);
            }
        }
        best.map_or(self.canonical.as_str(), |m| m.key.as_str())
    }

    /// Members ordered by descending count, ties in visit order
    pub fn members_by_count(&self) -> Vec<&Member> {
        let mut members: Vec<&Member> = self.members.iter().collect();
        members.sort_by(|a, b| b.count.cmp(&a.count));
        members
    }
}

/// All clusters of a run, in order of cluster creation
#[derive(Debug, Clone, Default)]
pub struct ClusterMap {
    clusters: Vec<Cluster>,
    slots: AHashMap<String, usize>,
    members: AHashMap<String, (usize, usize)>,
}

impl ClusterMap {
    /// Create an empty cluster map
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `count` to `key` as a member of the cluster of `canonical`
    ///
    /// The cluster is created on first use. Crediting a key twice adds to its
    /// existing member count.
    pub(crate) fn credit(&mut self, canonical: &str, key: &str, count: u64) {
        if let Some(&(slot, pos)) = self.members.get(key) {
            debug_assert_eq!(self.clusters[slot].canonical, canonical);
            self.clusters[slot].members[pos].count += count;
            return;
        }

        let slot = match self.slots.get(canonical) {
            Some(&slot) => slot,
            None => {
                let slot = self.clusters.len();
                self.clusters.push(Cluster::new(canonical));
                self.slots.insert(canonical.to_string(), slot);
                slot
            }
        };
        let cluster = &mut self.clusters[slot];
        self.members.insert(key.to_string(), (slot, cluster.members.len()));
        cluster.members.push(Member { key: key.to_string(), count });
    }

    /// Number of clusters
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    /// True if there is no cluster
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Number of member keys across all clusters
    pub fn num_keys(&self) -> usize {
        self.members.len()
    }

    /// Sum of all member counts across all clusters
    pub fn total(&self) -> u64 {
        self.clusters.iter().map(Cluster::total).sum()
    }

    /// Cluster identified by `canonical`
    pub fn get(&self, canonical: &str) -> Option<&Cluster> {
        self.slots.get(canonical).map(|&slot| &self.clusters[slot])
    }

    /// Cluster containing `key` as a member
    pub fn cluster_of(&self, key: &str) -> Option<&Cluster> {
        self.members.get(key).map(|&(slot, _)| &self.clusters[slot])
    }

    /// Canonical key of the cluster containing `key`
    pub fn root_of(&self, key: &str) -> Option<&str> {
        self.cluster_of(key).map(Cluster::canonical)
    }

    /// Iterate over clusters in order of creation
    pub fn iter(&self) -> std::slice::Iter<'_, Cluster> {
        self.clusters.iter()
    }
}

impl<'a> IntoIterator for &'a ClusterMap {
    type Item = &'a Cluster;
    type IntoIter = std::slice::Iter<'a, Cluster>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
