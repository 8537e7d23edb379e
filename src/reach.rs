//! Memoized reachability.
//!
//! A node's reach set in a direction is the union, over its immediate
//! neighbours on that side, of the neighbour itself and the neighbour's own
//! reach set. Sets are computed with an explicit stack so long chains cannot
//! exhaust the call stack, and a node met again while its own set is still
//! being computed is reported as a cycle.

use std::collections::BTreeSet;
use std::fmt::Debug;
use std::hash::Hash;
use tracing::{debug, trace};

use crate::error::{GraphError, GraphResult};
use crate::graph::Graph;

/// Which side of a node to follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Predecessor-ward
    Backward,
    /// Successor-ward
    Forward,
}

impl Direction {
    pub const BOTH: [Direction; 2] = [Direction::Backward, Direction::Forward];

    /// Orient the edge between `node` and its neighbour `other` on this side
    /// as `(from, to)`.
    pub(crate) fn edge(self, node: usize, other: usize) -> (usize, usize) {
        match self {
            Direction::Backward => (other, node),
            Direction::Forward => (node, other),
        }
    }
}

/// A node whose reach set is in progress, with the neighbours still to visit.
struct Frame {
    node: usize,
    pending: Vec<usize>,
    cursor: usize,
}

impl<K: Ord + Eq + Hash + Clone + Debug> Graph<K> {
    fn frame(&self, node: usize, dir: Direction) -> Frame {
        Frame {
            node,
            pending: self.nodes[node].neighbors(dir).iter().copied().collect(),
            cursor: 0,
        }
    }

    /// Memoize the reach set of every node in `dir`.
    pub(crate) fn memoize(&mut self, dir: Direction) -> GraphResult<(), K> {
        let mut on_path = vec![false; self.len()];
        for i in 0..self.len() {
            self.memoize_from(i, dir, &mut on_path)?;
        }
        Ok(())
    }

    /// Depth-first, post-order fill of reach sets starting at `start`.
    ///
    /// `on_path` marks nodes whose frame is on the stack; it is all false on
    /// entry and on successful exit.
    fn memoize_from(&mut self, start: usize, dir: Direction, on_path: &mut [bool]) -> GraphResult<(), K> {
        if self.nodes[start].reach(dir).is_some() {
            return Ok(());
        }
        on_path[start] = true;
        let mut path = vec![self.frame(start, dir)];

        while let Some(top) = path.last_mut() {
            match top.pending.get(top.cursor).copied() {
                Some(next) => {
                    top.cursor += 1;
                    if self.nodes[next].reach(dir).is_some() {
                        continue;
                    }
                    if on_path[next] {
                        return Err(self.cycle_on_path(&path, next, on_path));
                    }
                    on_path[next] = true;
                    path.push(self.frame(next, dir));
                }
                None => {
                    let Some(done) = path.pop() else { break };
                    on_path[done.node] = false;
                    let mut set = BTreeSet::new();
                    for &nb in &done.pending {
                        set.insert(nb);
                        if let Some(r) = self.nodes[nb].reach(dir) {
                            set.extend(r.iter().copied());
                        }
                    }
                    trace!(token = ?self.id(done.node), ?dir, size = set.len(), "memoized reach");
                    self.nodes[done.node].set_reach(dir, set);
                }
            }
        }
        Ok(())
    }

    fn cycle_on_path(&self, path: &[Frame], back_to: usize, on_path: &mut [bool]) -> GraphError<K> {
        let on_stack = path.iter().position(|f| f.node == back_to);
        debug_assert!(on_stack.is_some(), "back edge target {back_to} not on path");
        let from = on_stack.unwrap_or_default();
        let mut cyc: Vec<usize> = path[from..].iter().map(|f| f.node).collect();
        cyc.sort_unstable();
        for f in path {
            on_path[f.node] = false;
        }
        let stuck: Vec<K> = cyc.into_iter().map(|i| self.id(i).clone()).collect();
        debug!(?stuck, "cycle detected while computing reach");
        GraphError::cycle(stuck)
    }

    pub(crate) fn reach_contains(&self, node: usize, dir: Direction, other: usize) -> bool {
        self.nodes[node].reach(dir).is_some_and(|r| r.contains(&other))
    }

    /// Every token transitively reachable from `k` in `dir`, in order of
    /// first appearance. Fails on an unknown token or when a cycle is met.
    pub fn reach(&mut self, k: &K, dir: Direction) -> GraphResult<Vec<&K>, K> {
        let i = self.index_of(k)?;
        let mut on_path = vec![false; self.len()];
        self.memoize_from(i, dir, &mut on_path)?;
        let ids = self.nodes[i]
            .reach(dir)
            .map(|r| r.iter().map(|&j| self.id(j)).collect())
            .unwrap_or_default();
        Ok(ids)
    }

    /// Whether `to` can be reached from `from` by following one or more edges.
    pub fn is_reachable(&mut self, from: &K, to: &K) -> GraphResult<bool, K> {
        let (u, v) = (self.index_of(from)?, self.index_of(to)?);
        let mut on_path = vec![false; self.len()];
        self.memoize_from(u, Direction::Forward, &mut on_path)?;
        Ok(self.reach_contains(u, Direction::Forward, v))
    }

    /// Unordered token pairs the order leaves unrelated: neither reaches the
    /// other. These are the places where more than one linearization exists.
    pub fn incomparable_pairs(&mut self) -> GraphResult<Vec<(K, K)>, K> {
        self.memoize(Direction::Forward)?;
        let n = self.len();
        let mut pairs = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                if !self.reach_contains(i, Direction::Forward, j)
                    && !self.reach_contains(j, Direction::Forward, i)
                {
                    pairs.push((self.id(i).clone(), self.id(j).clone()));
                }
            }
        }
        Ok(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(rows: &[&[&'static str]]) -> Graph<&'static str> {
        Graph::from_sequences(rows.iter().map(|r| r.iter().copied()))
    }

    #[test]
    fn reach_includes_neighbours_and_their_reach() {
        let mut g = rows(&[&["a", "b", "c"], &["b", "d"]]);
        assert_eq!(g.reach(&"a", Direction::Forward).unwrap(), vec![&"b", &"c", &"d"]);
        assert_eq!(g.reach(&"c", Direction::Backward).unwrap(), vec![&"a", &"b"]);
        assert!(g.reach(&"a", Direction::Backward).unwrap().is_empty());
    }

    #[test]
    fn reach_is_cached_until_mutation() {
        let mut g = rows(&[&["a", "b"], &["c"]]);
        g.memoize(Direction::Forward).unwrap();
        assert!(g.node(&"a").unwrap().forward_reach.is_some());
        g.add_edge(&"b", &"c").unwrap();
        assert!(g.node(&"a").unwrap().forward_reach.is_none());
        assert!(g.is_reachable(&"a", &"c").unwrap());
        assert!(!g.is_reachable(&"c", &"a").unwrap());
    }

    #[test]
    fn long_chain_reach() {
        let chain: Vec<u32> = (0..3_000).collect();
        let mut g = Graph::from_sequences([chain]);
        assert!(g.is_reachable(&0, &2_999).unwrap());
        assert_eq!(g.reach(&2_999, Direction::Backward).unwrap().len(), 2_999);
    }

    #[test]
    fn two_cycle_is_reported() {
        let mut g = rows(&[&["a", "b"], &["b", "a"]]);
        let err = g.reach(&"a", Direction::Forward).unwrap_err();
        assert_eq!(err, GraphError::cycle(vec!["a", "b"]));
    }

    #[test]
    fn self_loop_is_reported() {
        let mut g = rows(&[&["x", "a", "a"]]);
        let err = g.memoize(Direction::Backward).unwrap_err();
        assert_eq!(err.stuck(), &["a"]);
    }

    #[test]
    fn cycle_reported_only_for_cycle_members() {
        let mut g = rows(&[&["root", "a", "b", "c"], &["c", "a"]]);
        let err = g.memoize(Direction::Forward).unwrap_err();
        assert_eq!(err.stuck(), &["a", "b", "c"]);
    }

    #[test]
    fn incomparable_pairs_list_unordered_tokens() {
        let mut g = rows(&[&["a", "b", "d"], &["a", "c", "d"]]);
        assert_eq!(g.incomparable_pairs().unwrap(), vec![("b", "c")]);
    }

    #[test]
    fn unknown_token_in_query() {
        let mut g = rows(&[&["a"]]);
        assert_eq!(g.is_reachable(&"a", &"q"), Err(GraphError::unknown_token("q")));
    }
}
