//! Alias resolution as a disjoint-set forest
//!
//! A key merged into another key's cluster becomes an alias: its parent link
//! points at the key it was merged into. Following parent links ends at the
//! canonical key of the cluster. `find` compresses the path it walked, and
//! `union` keeps the root carrying the larger total count.

/// Assignment state of a key during the correction pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    /// Not visited yet
    Unvisited,
    /// Canonical key of a cluster (a root of the forest)
    Canonical,
    /// Merged into another key's cluster
    Alias,
}

/// Disjoint-set forest over key ids with per-root total counts
#[derive(Debug, Clone)]
pub struct AliasResolver {
    parent: Vec<usize>,
    weight: Vec<u64>,
    state: Vec<KeyState>,
}

impl AliasResolver {
    /// Create a resolver for `num_keys` unvisited keys
    pub fn new(num_keys: usize) -> Self {
        Self {
            parent: (0..num_keys).collect(),
            weight: vec![0; num_keys],
            state: vec![KeyState::Unvisited; num_keys],
        }
    }

    /// Number of keys tracked
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    /// True if no key is tracked
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Current state of `id`
    #[inline]
    pub fn state(&self, id: usize) -> KeyState {
        self.state[id]
    }

    /// True if `id` is the canonical key of a cluster
    #[inline]
    pub fn is_canonical(&self, id: usize) -> bool {
        self.state[id] == KeyState::Canonical
    }

    /// True if `id` was merged into another cluster
    #[inline]
    pub fn is_alias(&self, id: usize) -> bool {
        self.state[id] == KeyState::Alias
    }

    /// True if `id` belongs to a cluster
    #[inline]
    pub fn is_resolved(&self, id: usize) -> bool {
        self.state[id] != KeyState::Unvisited
    }

    /// Total count credited to the cluster rooted at `root`
    pub fn weight(&self, root: usize) -> u64 {
        self.weight[root]
    }

    /// Start a new cluster with `id` as canonical key and `count` as its total
    pub fn make_canonical(&mut self, id: usize, count: u64) {
        debug_assert_eq!(self.state[id], KeyState::Unvisited);
        self.parent[id] = id;
        self.weight[id] = count;
        self.state[id] = KeyState::Canonical;
    }

    /// Add `count` to the cluster containing `id`, returning the cluster root
    pub fn credit(&mut self, id: usize, count: u64) -> usize {
        let root = self.find(id);
        self.weight[root] += count;
        root
    }

    /// Root of `id`, compressing the walked chain onto it
    pub fn find(&mut self, id: usize) -> usize {
        let root = self.root_of(id);
        let mut cur = id;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    /// Root of `id` without modifying the forest
    pub fn root_of(&self, id: usize) -> usize {
        let mut cur = id;
        while self.parent[cur] != cur {
            cur = self.parent[cur];
        }
        cur
    }

    /// Number of parent links between `id` and its root
    pub fn chain_length(&self, id: usize) -> usize {
        let mut hops = 0;
        let mut cur = id;
        while self.parent[cur] != cur {
            cur = self.parent[cur];
            hops += 1;
        }
        hops
    }

    /// Merge the unvisited key `id` carrying `count` into the cluster of `target`
    ///
    /// The alias link of `id` points directly at the root of `target`. Union
    /// is by count: the root with the larger total stays canonical, and an
    /// established root wins ties. Returns the root of the merged cluster.
    pub fn merge(&mut self, id: usize, count: u64, target: usize) -> usize {
        debug_assert_eq!(self.state[id], KeyState::Unvisited);
        let root = self.find(target);
        self.make_canonical(id, count);
        self.union(root, id)
    }

    /// Union the clusters rooted at `established` and `joining`
    fn union(&mut self, established: usize, joining: usize) -> usize {
        if established == joining {
            return established;
        }
        let (root, child) = if self.weight[joining] > self.weight[established] {
            (joining, established)
        } else {
            (established, joining)
        };
        self.parent[child] = root;
        self.state[child] = KeyState::Alias;
        self.weight[root] += self.weight[child];
        root
    }
}
