//! The snapshot structure and its traversals.
//!
//! [`NavTree`] stores its nodes in a [`Vec`] arena together with a key index
//! for identity lookups. Slots are laid out in pre-order, so the root is
//! always slot 0 and a parent's slot precedes all of its descendants.
//!
//! # Invariants
//!
//! - Every key occurs at most once per snapshot.
//! - A node has at most one active child, and it is one of its children.
//! - Parent links are plain indices; ownership flows root-to-leaf only.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use navtree_types::{NodeDef, NodeKey};

use crate::error::{TreeError, TreeResult};

/// Arena entry for one node.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Slot {
    key: NodeKey,
    parent: Option<usize>,
    children: Vec<usize>,
    active: Option<usize>,
    depth: usize,
}

/// An immutable navigation tree snapshot.
///
/// Built top-down from a [`NodeDef`] by [`NavTree::build`]; the structural
/// invariants are checked there and hold for the lifetime of the value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "NodeDef", into = "NodeDef")]
pub struct NavTree {
    nodes: Vec<Slot>,
    index: HashMap<NodeKey, usize>,
}

impl NavTree {
    /// Build and validate a snapshot from a nested definition.
    ///
    /// Fails on invalid keys, on a key that appears more than once, and on
    /// a node with several active children. The `active` flag of the root
    /// definition is ignored: the root has no parent to be active under.
    pub fn build(def: &NodeDef) -> TreeResult<Self> {
        let mut tree = NavTree {
            nodes: Vec::with_capacity(def.len()),
            index: HashMap::with_capacity(def.len()),
        };

        let mut stack: Vec<(&NodeDef, Option<usize>)> = vec![(def, None)];
        while let Some((node_def, parent)) = stack.pop() {
            let key = NodeKey::new(node_def.key.as_str()).map_err(|source| {
                TreeError::InvalidKey {
                    key: node_def.key.clone(),
                    source,
                }
            })?;

            let idx = tree.nodes.len();
            if tree.index.insert(key.clone(), idx).is_some() {
                return Err(TreeError::DuplicateKey(key));
            }

            let depth = parent.map_or(0, |p| tree.nodes[p].depth + 1);
            if let Some(p) = parent {
                if node_def.active {
                    if let Some(existing) = tree.nodes[p].active {
                        return Err(TreeError::MultipleActiveChildren {
                            parent: tree.nodes[p].key.clone(),
                            first: tree.nodes[existing].key.clone(),
                            second: key,
                        });
                    }
                    tree.nodes[p].active = Some(idx);
                }
                tree.nodes[p].children.push(idx);
            }

            tree.nodes.push(Slot {
                key,
                parent,
                children: Vec::with_capacity(node_def.children.len()),
                active: None,
                depth,
            });

            // Reversed so that siblings are popped, and therefore stored, in order.
            for child in node_def.children.iter().rev() {
                stack.push((child, Some(idx)));
            }
        }

        debug!(
            root = %tree.nodes[0].key,
            nodes = tree.nodes.len(),
            "built navigation tree"
        );
        Ok(tree)
    }

    /// The root node.
    pub fn root(&self) -> NavNode<'_> {
        NavNode { tree: self, idx: 0 }
    }

    /// Look up a node by key.
    pub fn get(&self, key: &str) -> Option<NavNode<'_>> {
        self.index
            .get(key)
            .map(|&idx| NavNode { tree: self, idx })
    }

    /// Returns `true` if a node with this key exists anywhere in the tree.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: a snapshot has at least a root.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Length of the longest root-to-leaf path, counted in edges.
    pub fn depth(&self) -> usize {
        self.nodes.iter().map(|s| s.depth).max().unwrap_or(0)
    }

    /// All nodes, each parent before its children.
    pub fn pre_order(&self) -> impl ExactSizeIterator<Item = NavNode<'_>> + '_ {
        (0..self.nodes.len()).map(move |idx| NavNode { tree: self, idx })
    }

    /// All nodes, each parent after all of its children.
    pub fn post_order(&self) -> Vec<NavNode<'_>> {
        let mut result = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(usize, bool)> = vec![(0, false)];

        while let Some((idx, expanded)) = stack.pop() {
            if expanded {
                result.push(NavNode { tree: self, idx });
                continue;
            }
            stack.push((idx, true));
            for &child in self.nodes[idx].children.iter().rev() {
                stack.push((child, false));
            }
        }

        result
    }

    /// The visible navigation stack: the root followed by each active child
    /// in turn, ending at the first node without one.
    pub fn active_path(&self) -> Vec<NavNode<'_>> {
        let mut path = vec![self.root()];
        let mut current = self.root();
        while let Some(next) = current.active_child() {
            path.push(next);
            current = next;
        }
        path
    }

    /// Convert back into a nested definition.
    pub fn to_def(&self) -> NodeDef {
        self.def_for(0)
    }

    fn def_for(&self, idx: usize) -> NodeDef {
        let slot = &self.nodes[idx];
        let active = slot
            .parent
            .is_some_and(|p| self.nodes[p].active == Some(idx));
        NodeDef {
            key: slot.key.as_str().to_string(),
            active,
            children: slot.children.iter().map(|&c| self.def_for(c)).collect(),
        }
    }

    /// An indented text rendering, one node per line, with active children
    /// marked by a trailing `*`.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        for node in self.pre_order() {
            out.push_str(&"  ".repeat(node.depth()));
            out.push_str(node.key().as_str());
            if node.is_active() {
                out.push_str(" *");
            }
            out.push('\n');
        }
        out
    }
}

impl fmt::Debug for NavTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavTree")
            .field("root", self.root().key())
            .field("len", &self.len())
            .finish()
    }
}

impl TryFrom<NodeDef> for NavTree {
    type Error = TreeError;

    fn try_from(def: NodeDef) -> TreeResult<Self> {
        Self::build(&def)
    }
}

impl From<NavTree> for NodeDef {
    fn from(tree: NavTree) -> Self {
        tree.to_def()
    }
}

/// A borrowed handle to one node of a [`NavTree`].
#[derive(Clone, Copy)]
pub struct NavNode<'t> {
    tree: &'t NavTree,
    idx: usize,
}

impl<'t> NavNode<'t> {
    fn slot(&self) -> &'t Slot {
        &self.tree.nodes[self.idx]
    }

    /// The node's identity.
    pub fn key(&self) -> &'t NodeKey {
        &self.slot().key
    }

    /// The parent node, or `None` for the root.
    pub fn parent(&self) -> Option<NavNode<'t>> {
        let tree = self.tree;
        self.slot().parent.map(|idx| NavNode { tree, idx })
    }

    /// The parent's key, or `None` for the root.
    pub fn parent_key(&self) -> Option<&'t NodeKey> {
        self.parent().map(|p| p.key())
    }

    /// Children in order.
    pub fn children(&self) -> impl ExactSizeIterator<Item = NavNode<'t>> + 't {
        let tree = self.tree;
        self.slot()
            .children
            .iter()
            .map(move |&idx| NavNode { tree, idx })
    }

    /// Keys of the children in order.
    pub fn child_keys(&self) -> Vec<NodeKey> {
        self.children().map(|c| c.key().clone()).collect()
    }

    /// The active child, if any.
    pub fn active_child(&self) -> Option<NavNode<'t>> {
        let tree = self.tree;
        self.slot().active.map(|idx| NavNode { tree, idx })
    }

    /// Returns `true` if this node is the active child of its parent.
    pub fn is_active(&self) -> bool {
        self.slot()
            .parent
            .is_some_and(|p| self.tree.nodes[p].active == Some(self.idx))
    }

    /// Returns `true` if this node has no parent.
    pub fn is_root(&self) -> bool {
        self.slot().parent.is_none()
    }

    /// Returns `true` if this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.slot().children.is_empty()
    }

    /// Distance from the root, counted in edges.
    pub fn depth(&self) -> usize {
        self.slot().depth
    }
}

impl PartialEq for NavNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.idx == other.idx
    }
}

impl Eq for NavNode<'_> {}

impl fmt::Debug for NavNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NavNode({})", self.key())
    }
}
