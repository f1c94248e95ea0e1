//! Immutable navigation tree snapshots.
//!
//! A [`NavTree`] is built once from a [`NodeDef`](navtree_types::NodeDef) and
//! never changes afterwards. Nodes live in an arena; each node owns the
//! indices of its children and keeps a non-owning index back to its parent,
//! so upward lookups never create ownership cycles.
//!
//! # Key Types
//!
//! - [`NavTree`] -- Validated, immutable snapshot
//! - [`NavNode`] -- Borrowed handle to one node of a snapshot
//! - [`TreeError`] -- Invariant violations detected while building

pub mod error;
pub mod tree;

pub use error::{TreeError, TreeResult};
pub use tree::{NavNode, NavTree};
