//! Error types for graph operations.

use std::fmt::Debug;
use thiserror::Error;

/// Result type for graph operations
pub type GraphResult<T, K> = Result<T, GraphError<K>>;

/// Errors raised while reducing, linearizing or editing a [`Graph`](crate::Graph).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GraphError<K: Debug> {
    /// The input encodes a contradictory order: some token transitively
    /// precedes itself.
    #[error("unsatisfiable order, cycle involving {stuck:?}")]
    Cycle {
        /// Tokens still holding unresolved predecessors, or lying on the
        /// detected cycle path, in order of first appearance.
        stuck: Vec<K>,
    },

    /// An edge or query referenced a token the registry has never seen.
    #[error("unknown token: {token:?}")]
    UnknownToken {
        /// The token that was not found
        token: K,
    },
}

impl<K: Debug> GraphError<K> {
    /// Creates a cycle error over the given tokens
    pub fn cycle(stuck: Vec<K>) -> Self {
        Self::Cycle { stuck }
    }

    /// Creates an unknown token error
    pub fn unknown_token(token: K) -> Self {
        Self::UnknownToken { token }
    }

    /// Tokens implicated in a cycle, empty for other errors.
    pub fn stuck(&self) -> &[K] {
        match self {
            Self::Cycle { stuck } => stuck,
            Self::UnknownToken { .. } => &[],
        }
    }

    pub fn is_cycle(&self) -> bool {
        matches!(self, Self::Cycle { .. })
    }
}
