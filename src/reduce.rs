//! Transitive reduction down to Hasse (cover) edges.

use std::collections::BTreeSet;
use std::fmt::Debug;
use std::hash::Hash;
use tracing::{debug, trace};

use crate::error::GraphResult;
use crate::graph::Graph;
use crate::reach::Direction;

impl<K: Ord + Eq + Hash + Clone + Debug> Graph<K> {
    /// Strip every edge implied by a longer path, leaving the Hasse edges.
    ///
    /// An edge between a node and its neighbour `x` is dropped when another
    /// neighbour `y` on the same side already reaches `x`. All decisions are
    /// made against the reach sets of the unreduced graph before any edge is
    /// removed, so the result does not depend on visiting order and a second
    /// pass removes nothing.
    ///
    /// Returns the number of edges removed. On a cyclic graph this fails with
    /// [`GraphError::Cycle`](crate::GraphError::Cycle) and no edge is touched.
    pub fn reduce(&mut self) -> GraphResult<usize, K> {
        for dir in Direction::BOTH {
            self.memoize(dir)?;
        }

        let mut implied: BTreeSet<(usize, usize)> = BTreeSet::new();
        for node in 0..self.len() {
            for dir in Direction::BOTH {
                let side = self.nodes[node].neighbors(dir);
                for &x in side {
                    let via = side
                        .iter()
                        .find(|&&y| y != x && self.reach_contains(y, dir, x));
                    if let Some(&y) = via {
                        let (from, to) = dir.edge(node, x);
                        trace!(
                            from = ?self.id(from),
                            to = ?self.id(to),
                            via = ?self.id(y),
                            "edge implied by longer path"
                        );
                        implied.insert((from, to));
                    }
                }
            }
        }

        // Reduction keeps the reachability closure, so memoized reach stays valid.
        let removed = implied.len();
        for (from, to) in implied {
            self.unlink(from, to);
        }
        debug!(removed, remaining = self.edge_count(), "transitive reduction done");
        Ok(removed)
    }

    /// Reduced copy of this graph, leaving `self` untouched.
    pub fn reduced(&self) -> GraphResult<Self, K> {
        let mut g = self.clone();
        g.reduce()?;
        Ok(g)
    }
}
