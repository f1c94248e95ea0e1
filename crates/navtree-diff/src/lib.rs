//! Diff engine for navigation trees.
//!
//! Compares a "last" and a "current" [`NavTree`](navtree_tree::NavTree)
//! snapshot and produces the ordered edit actions a UI layer applies to move
//! its view hierarchy from one to the other.
//!
//! # Key Types
//!
//! - [`diff_trees`] -- The differ itself (pure, total, deterministic)
//! - [`NavDiff`] / [`DiffAction`] -- Ordered result and its four action kinds
//! - [`DiffPhase`] -- The three phases the output is sorted into

pub mod action;
pub mod tree_diff;

pub use action::{DiffAction, DiffPhase, NavDiff};
pub use tree_diff::diff_trees;
