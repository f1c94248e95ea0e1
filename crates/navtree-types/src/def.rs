//! Nested tree definitions.
//!
//! A [`NodeDef`] is the owned, recursive form of a navigation tree. It is what
//! applications build in code and what gets written to and read from JSON.
//! Definitions are not validated; turning one into a snapshot is where
//! duplicate keys and conflicting active markers are caught.

use serde::{Deserialize, Serialize};

/// One node of a nested tree definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDef {
    /// Route segment identifying this destination.
    pub key: String,
    /// Whether this node is the active child of its parent.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub active: bool,
    /// Ordered children (on-screen or tab order).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeDef>,
}

impl NodeDef {
    /// A leaf definition that is not active.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            active: false,
            children: Vec::new(),
        }
    }

    /// Mark this node as the active child of its parent.
    pub fn active(mut self) -> Self {
        self.active = true;
        self
    }

    /// Append a child.
    pub fn child(mut self, child: NodeDef) -> Self {
        self.children.push(child);
        self
    }

    /// Append several children in order.
    pub fn children(mut self, children: impl IntoIterator<Item = NodeDef>) -> Self {
        self.children.extend(children);
        self
    }

    /// Total number of nodes in this definition, including itself.
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(NodeDef::len).sum::<usize>()
    }

    /// Always `false`: a definition has at least its own node.
    pub fn is_empty(&self) -> bool {
        false
    }
}
