//! # seqorder
//!
//! Infer one global order from overlapping observed subsequences.
//!
//! Every adjacent pair in an input sequence becomes a precedence edge. The
//! resulting graph can be reduced to its Hasse edges (the transitive
//! reduction: the fewest edges implying every observed constraint) and
//! linearized into one total order via a deterministic topological sort.
//! Contradictory input is reported as a cycle, never as a partial order.
//!
//! ```
//! let g = seqorder::build_graph([
//!     vec!["queso", "papel", "gato"],
//!     vec!["papel", "arbol", "silla"],
//! ]);
//! let g = seqorder::reduce(g).unwrap();
//! let order = seqorder::linearize(&g).unwrap();
//! assert_eq!(order, ["queso", "papel", "gato", "arbol", "silla"]);
//! ```
mod error;
mod graph;
mod linearize;
mod reach;
mod reduce;
pub mod rows;

use std::fmt::Debug;
use std::hash::Hash;

pub use error::{GraphError, GraphResult};
pub use graph::{Graph, Node};
pub use linearize::TieBreak;
pub use reach::Direction;

/// Build the precedence graph from token sequences.
pub fn build_graph<K, I, S>(sequences: I) -> Graph<K>
where
    K: Ord + Eq + Hash + Clone + Debug,
    I: IntoIterator<Item = S>,
    S: IntoIterator<Item = K>,
{
    Graph::from_sequences(sequences)
}

/// Transitively reduce `graph`, failing on cyclic input.
pub fn reduce<K: Ord + Eq + Hash + Clone + Debug>(mut graph: Graph<K>) -> GraphResult<Graph<K>, K> {
    graph.reduce()?;
    Ok(graph)
}

/// One topological order of `graph`, ties broken by first appearance.
pub fn linearize<K: Ord + Eq + Hash + Clone + Debug>(graph: &Graph<K>) -> GraphResult<Vec<K>, K> {
    graph.linearize()
}
