//! Deterministic topological sort (Kahn's algorithm).

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap};
use std::fmt::Debug;
use std::hash::Hash;
use tracing::debug;

use crate::error::{GraphError, GraphResult};
use crate::graph::Graph;

/// Rule for choosing among several tokens that are ready at the same time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TieBreak {
    /// Smallest order-of-first-appearance index
    #[default]
    Appearance,
    /// Smallest token under `Ord`
    Lexicographic,
}

impl<K: Ord + Eq + Hash + Clone + Debug> Graph<K> {
    /// Rank of each node under `tie_break`, indexed by appearance index.
    fn ranks(&self, tie_break: TieBreak) -> Vec<usize> {
        let mut by: Vec<usize> = (0..self.len()).collect();
        if tie_break == TieBreak::Lexicographic {
            by.sort_by(|&a, &b| self.id(a).cmp(self.id(b)));
        }
        let mut rank = vec![0; self.len()];
        for (r, i) in by.into_iter().enumerate() {
            rank[i] = r;
        }
        rank
    }

    /// One topological order, breaking ties by first appearance.
    pub fn linearize(&self) -> GraphResult<Vec<K>, K> {
        self.linearize_with(TieBreak::default())
    }

    /// One topological order, breaking ties with `tie_break`.
    ///
    /// Fails with [`GraphError::Cycle`] listing every token that still had
    /// unresolved predecessors once no more tokens were ready. No partial
    /// order is returned.
    pub fn linearize_with(&self, tie_break: TieBreak) -> GraphResult<Vec<K>, K> {
        let rank = self.ranks(tie_break);
        let mut pending: Vec<BTreeSet<usize>> =
            self.nodes.values().map(|n| n.predecessors.clone()).collect();
        let mut visited = vec![false; self.len()];

        let mut ready: BinaryHeap<Reverse<(usize, usize)>> = pending
            .iter()
            .enumerate()
            .filter(|(_, preds)| preds.is_empty())
            .map(|(i, _)| Reverse((rank[i], i)))
            .collect();

        let mut order = Vec::with_capacity(self.len());
        while let Some(Reverse((_, i))) = ready.pop() {
            visited[i] = true;
            order.push(self.id(i).clone());
            for &s in &self.nodes[i].successors {
                let preds = &mut pending[s];
                if preds.remove(&i) && preds.is_empty() {
                    ready.push(Reverse((rank[s], s)));
                }
            }
        }

        let stuck: Vec<K> = visited
            .iter()
            .enumerate()
            .filter(|&(_, &seen)| !seen)
            .map(|(i, _)| self.id(i).clone())
            .collect();
        if !stuck.is_empty() {
            debug!(?stuck, emitted = order.len(), "linearization blocked by cycle");
            return Err(GraphError::cycle(stuck));
        }
        debug!(len = order.len(), ?tie_break, "linearized");
        Ok(order)
    }
}
