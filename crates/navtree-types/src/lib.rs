//! Foundation types for navigation trees.
//!
//! Every other navtree crate depends on `navtree-types`. The types here carry
//! no structural invariants of their own; those are enforced when a
//! definition is turned into a snapshot by `navtree-tree`.
//!
//! # Key Types
//!
//! - [`NodeKey`] -- Identity of a navigation destination across snapshots
//! - [`NodeDef`] -- Nested, serializable definition of a tree
//! - [`TypeError`] -- Validation failures for keys

pub mod def;
pub mod error;
pub mod key;

pub use def::NodeDef;
pub use error::TypeError;
pub use key::NodeKey;
