//! Error types for tree construction.

use navtree_types::{NodeKey, TypeError};

/// Structural invariant violations found while building a [`NavTree`](crate::NavTree).
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// A node key failed validation.
    #[error("invalid node key {key:?}: {source}")]
    InvalidKey {
        key: String,
        #[source]
        source: TypeError,
    },

    /// The same key appears twice in one snapshot. This is also how a node
    /// listed under two different parents shows up.
    #[error("duplicate node key {0}: a destination may appear only once per tree")]
    DuplicateKey(NodeKey),

    /// More than one child of a node is marked active.
    #[error("node {parent} has more than one active child: {first} and {second}")]
    MultipleActiveChildren {
        parent: NodeKey,
        first: NodeKey,
        second: NodeKey,
    },
}

/// Convenience alias for tree results.
pub type TreeResult<T> = Result<T, TreeError>;
