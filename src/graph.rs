use ordermap::OrderMap;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::BTreeSet;
use std::fmt::Debug;
use std::hash::Hash;
use tracing::debug;

use crate::error::{GraphError, GraphResult};
use crate::reach::Direction;

/// One distinct token and its immediate neighbourhood.
///
/// Neighbours are stored as order-of-appearance (OOA) indices into the
/// owning [`Graph`].
#[derive(Debug, Clone)]
pub struct Node<K> {
    pub(crate) id: K,
    /// Immediate predecessors: indices that must come before this node
    pub(crate) predecessors: BTreeSet<usize>,
    /// Immediate successors: indices that must come after this node
    pub(crate) successors: BTreeSet<usize>,
    /// Transitive predecessors, `None` until memoized
    pub(crate) backward_reach: Option<BTreeSet<usize>>,
    /// Transitive successors, `None` until memoized
    pub(crate) forward_reach: Option<BTreeSet<usize>>,
}

impl<K> Node<K> {
    fn new(id: K) -> Self {
        Self {
            id,
            predecessors: BTreeSet::new(),
            successors: BTreeSet::new(),
            backward_reach: None,
            forward_reach: None,
        }
    }

    pub fn id(&self) -> &K {
        &self.id
    }

    pub(crate) fn neighbors(&self, dir: Direction) -> &BTreeSet<usize> {
        match dir {
            Direction::Backward => &self.predecessors,
            Direction::Forward => &self.successors,
        }
    }

    pub(crate) fn reach(&self, dir: Direction) -> Option<&BTreeSet<usize>> {
        match dir {
            Direction::Backward => self.backward_reach.as_ref(),
            Direction::Forward => self.forward_reach.as_ref(),
        }
    }

    pub(crate) fn set_reach(&mut self, dir: Direction, set: BTreeSet<usize>) {
        match dir {
            Direction::Backward => self.backward_reach = Some(set),
            Direction::Forward => self.forward_reach = Some(set),
        }
    }
}

/// Precedence graph inferred from overlapping token sequences.
///
/// Every token seen becomes a node, indexed by order of first appearance.
/// An edge `a -> b` records that `a` was observed immediately before `b` in
/// some sequence.
#[derive(Debug, Clone)]
pub struct Graph<K> {
    /// Stable order-of-appearance registry: key -> node
    pub(crate) nodes: OrderMap<K, Node<K>>,
}

impl<K: Ord + Eq + Hash + Clone + Debug> Default for Graph<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Eq + Hash + Clone + Debug> Graph<K> {
    pub fn new() -> Self {
        Self { nodes: OrderMap::new() }
    }

    /// Build the graph from a collection of sequences.
    ///
    /// Each adjacent pair `(s[i-1], s[i])` becomes an edge. Contradictory
    /// evidence is recorded as-is and surfaces later as a cycle.
    pub fn from_sequences<I, S>(sequences: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: IntoIterator<Item = K>,
    {
        let mut g = Self::new();
        for seq in sequences {
            g.absorb(seq);
        }
        debug!(nodes = g.len(), edges = g.edge_count(), "built precedence graph");
        g
    }

    fn absorb<S: IntoIterator<Item = K>>(&mut self, seq: S) {
        let mut prev = None;
        for k in seq {
            let i = self.intern(k);
            if let Some(p) = prev {
                self.link(p, i);
            }
            prev = Some(i);
        }
    }

    fn intern(&mut self, k: K) -> usize {
        if let Some(i) = self.nodes.get_index_of(&k) {
            return i;
        }
        let (i, _) = self.nodes.insert_full(k.clone(), Node::new(k));
        i
    }

    /// Register a token without any edges. Returns false if it already existed.
    pub fn add_token(&mut self, k: K) -> bool {
        let before = self.len();
        self.intern(k);
        self.len() != before
    }

    /// Add the edge `from -> to`. Both tokens must already be registered.
    ///
    /// Invalidates any memoized reach sets.
    pub fn add_edge(&mut self, from: &K, to: &K) -> GraphResult<(), K> {
        let (u, v) = (self.index_of(from)?, self.index_of(to)?);
        self.link(u, v);
        self.invalidate_reach();
        Ok(())
    }

    /// Remove the edge `from -> to` from both endpoints.
    ///
    /// Returns whether the edge existed. Invalidates memoized reach sets when
    /// it did.
    pub fn remove_edge(&mut self, from: &K, to: &K) -> GraphResult<bool, K> {
        let (u, v) = (self.index_of(from)?, self.index_of(to)?);
        let removed = self.unlink(u, v);
        if removed {
            self.invalidate_reach();
        }
        Ok(removed)
    }

    /// Single mutation point for edge insertion: updates both sides.
    pub(crate) fn link(&mut self, u: usize, v: usize) {
        self.nodes[u].successors.insert(v);
        self.nodes[v].predecessors.insert(u);
    }

    /// Single mutation point for edge removal: updates both sides.
    pub(crate) fn unlink(&mut self, u: usize, v: usize) -> bool {
        let out = self.nodes[u].successors.remove(&v);
        let inc = self.nodes[v].predecessors.remove(&u);
        debug_assert_eq!(out, inc, "asymmetric edge {u} -> {v}");
        out
    }

    pub(crate) fn invalidate_reach(&mut self) {
        for node in self.nodes.values_mut() {
            node.backward_reach = None;
            node.forward_reach = None;
        }
    }

    pub(crate) fn index_of(&self, k: &K) -> GraphResult<usize, K> {
        self.nodes
            .get_index_of(k)
            .ok_or_else(|| GraphError::unknown_token(k.clone()))
    }

    pub(crate) fn id(&self, i: usize) -> &K {
        &self.nodes[i].id
    }

    fn ids(&self, set: &BTreeSet<usize>) -> Vec<&K> {
        set.iter().map(|&i| self.id(i)).collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, k: &K) -> bool {
        self.nodes.contains_key(k)
    }

    /// Tokens in order of first appearance
    pub fn tokens(&self) -> impl Iterator<Item = &K> {
        self.nodes.keys()
    }

    pub fn node(&self, k: &K) -> Option<&Node<K>> {
        self.nodes.get(k)
    }

    /// Immediate predecessors of `k`, in order of first appearance.
    pub fn predecessors(&self, k: &K) -> GraphResult<Vec<&K>, K> {
        let i = self.index_of(k)?;
        Ok(self.ids(&self.nodes[i].predecessors))
    }

    /// Immediate successors of `k`, in order of first appearance.
    pub fn successors(&self, k: &K) -> GraphResult<Vec<&K>, K> {
        let i = self.index_of(k)?;
        Ok(self.ids(&self.nodes[i].successors))
    }

    /// All edges `(from, to)`, sorted by the appearance index of `from` then `to`.
    pub fn edges(&self) -> Vec<(&K, &K)> {
        self.nodes
            .values()
            .flat_map(|n| n.successors.iter().map(move |&v| (&n.id, self.id(v))))
            .collect()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|n| n.successors.len()).sum()
    }

    /// Tokens with no predecessors
    pub fn roots(&self) -> Vec<&K> {
        self.nodes
            .values()
            .filter(|n| n.predecessors.is_empty())
            .map(|n| &n.id)
            .collect()
    }

    /// Tokens with no successors
    pub fn leaves(&self) -> Vec<&K> {
        self.nodes
            .values()
            .filter(|n| n.successors.is_empty())
            .map(|n| &n.id)
            .collect()
    }

    /// Export to a petgraph `DiGraph`; node index `i` is the token with
    /// appearance index `i`.
    pub fn to_digraph(&self) -> DiGraph<K, ()> {
        let mut g = DiGraph::with_capacity(self.len(), self.edge_count());
        let ix: Vec<NodeIndex> = self.nodes.keys().map(|k| g.add_node(k.clone())).collect();
        for (u, node) in self.nodes.values().enumerate() {
            for &v in &node.successors {
                g.add_edge(ix[u], ix[v], ());
            }
        }
        g
    }
}
