//! Reference renderer: an in-memory model of a UI view tree.
//!
//! [`ViewHierarchy`] applies diff actions the way a navigation UI would:
//! popping a view drops everything presented on top of it, pushing appends a
//! view to its container, and a batched change replaces a container's whole
//! child list.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use navtree_tree::NavTree;
use navtree_types::NodeKey;

use crate::config::RenderConfig;
use crate::error::{RenderError, RenderResult};
use crate::renderer::NavigationRenderer;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct View {
    parent: Option<NodeKey>,
    children: Vec<NodeKey>,
    active: Option<NodeKey>,
}

/// A mutable view tree driven by [`NavigationRenderer`] calls.
#[derive(Clone, Debug, Default)]
pub struct ViewHierarchy {
    config: RenderConfig,
    root: Option<NodeKey>,
    views: HashMap<NodeKey, View>,
}

impl ViewHierarchy {
    /// An empty hierarchy.
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// A hierarchy mirroring `tree`, including its active children.
    pub fn from_tree(tree: &NavTree, config: RenderConfig) -> Self {
        let views = tree
            .pre_order()
            .map(|node| {
                let view = View {
                    parent: node.parent_key().cloned(),
                    children: node.child_keys(),
                    active: node.active_child().map(|c| c.key().clone()),
                };
                (node.key().clone(), view)
            })
            .collect();

        Self {
            config,
            root: Some(tree.root().key().clone()),
            views,
        }
    }

    /// The installed root, if any.
    pub fn root(&self) -> Option<&NodeKey> {
        self.root.as_ref()
    }

    /// Number of views.
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// Returns `true` if no view is installed.
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Returns `true` if a view with this key exists.
    pub fn contains(&self, key: &str) -> bool {
        self.views.contains_key(key)
    }

    /// Children of a view, in order.
    pub fn children(&self, key: &str) -> Option<&[NodeKey]> {
        self.views.get(key).map(|v| v.children.as_slice())
    }

    /// The active child of a view.
    pub fn active_child(&self, key: &str) -> Option<&NodeKey> {
        self.views.get(key).and_then(|v| v.active.as_ref())
    }

    /// The root followed by each active child in turn.
    pub fn active_path(&self) -> Vec<&NodeKey> {
        let mut path = Vec::new();
        let mut current = self.root.as_ref();
        while let Some(key) = current {
            path.push(key);
            current = self.active_child(key.as_str());
        }
        path
    }

    /// Returns `true` if this hierarchy holds exactly the nodes of `tree`,
    /// with the same root and the same set of children under every node.
    /// Sibling order and active markers are not compared.
    pub fn structure_matches(&self, tree: &NavTree) -> bool {
        if self.root.as_ref() != Some(tree.root().key()) || self.views.len() != tree.len() {
            return false;
        }
        tree.pre_order().all(|node| {
            let Some(view) = self.views.get(node.key().as_str()) else {
                return false;
            };
            let expected: HashSet<&NodeKey> = node.children().map(|c| c.key()).collect();
            let actual: HashSet<&NodeKey> = view.children.iter().collect();
            expected == actual
        })
    }

    /// Fail in strict mode, log and carry on otherwise.
    fn reject(&self, err: RenderError) -> RenderResult<()> {
        if self.config.strict {
            return Err(err);
        }
        warn!(error = %err, "skipping render action");
        Ok(())
    }

    /// Detach `key` from its container and drop its whole subtree.
    fn remove_subtree(&mut self, key: &NodeKey) {
        let Some(view) = self.views.get(key) else {
            return;
        };
        match view.parent.clone() {
            Some(parent) => {
                if let Some(parent_view) = self.views.get_mut(&parent) {
                    parent_view.children.retain(|c| c != key);
                    if parent_view.active.as_ref() == Some(key) {
                        parent_view.active = None;
                    }
                }
            }
            None => {
                if self.root.as_ref() == Some(key) {
                    self.root = None;
                }
            }
        }

        let mut stack = vec![key.clone()];
        while let Some(next) = stack.pop() {
            if let Some(view) = self.views.remove(&next) {
                stack.extend(view.children);
            }
        }
    }

    fn install(&mut self, key: &NodeKey, parent: Option<&NodeKey>) {
        self.views.insert(
            key.clone(),
            View {
                parent: parent.cloned(),
                ..View::default()
            },
        );
    }
}

impl NavigationRenderer for ViewHierarchy {
    type Error = RenderError;

    fn pop(&mut self, node: &NodeKey, _parent: Option<&NodeKey>) -> RenderResult<()> {
        if !self.views.contains_key(node) {
            return self.reject(RenderError::UnknownNode(node.clone()));
        }
        self.remove_subtree(node);
        debug!(%node, "popped view");
        Ok(())
    }

    fn push(&mut self, node: &NodeKey, parent: Option<&NodeKey>) -> RenderResult<()> {
        if self.views.contains_key(node) {
            return self.reject(RenderError::DuplicateNode(node.clone()));
        }

        match parent {
            Some(parent) => {
                if !self.views.contains_key(parent) {
                    return self.reject(RenderError::UnknownParent(parent.clone()));
                }
                if let Some(parent_view) = self.views.get_mut(parent) {
                    parent_view.children.push(node.clone());
                }
            }
            None => {
                if let Some(root) = &self.root {
                    return self.reject(RenderError::RootOccupied(root.clone()));
                }
                self.root = Some(node.clone());
            }
        }

        self.install(node, parent);
        debug!(%node, "pushed view");
        Ok(())
    }

    fn changed(
        &mut self,
        parent: Option<&NodeKey>,
        popped: &[NodeKey],
        pushed: &[NodeKey],
    ) -> RenderResult<()> {
        // Validate everything up front so a strict failure leaves no partial edit.
        if let Some(parent) = parent {
            if !self.views.contains_key(parent) {
                return self.reject(RenderError::UnknownParent(parent.clone()));
            }
        } else if pushed.len() > 1 {
            return self.reject(RenderError::MultipleRoots(pushed.len()));
        }
        if let Some(missing) = popped.iter().find(|k| !self.views.contains_key(*k)) {
            return self.reject(RenderError::UnknownNode(missing.clone()));
        }
        let removed: HashSet<&NodeKey> = popped.iter().collect();
        if let Some((node, view)) = pushed.iter().find_map(|k| {
            self.views
                .get(k)
                .filter(|v| !removed.contains(k) && v.parent.as_ref() != parent)
                .map(|v| (k, v))
        }) {
            return self.reject(RenderError::ForeignNode {
                node: node.clone(),
                current: view.parent.clone(),
            });
        }

        for key in popped {
            self.remove_subtree(key);
        }

        match parent {
            Some(parent) => {
                let previous = self
                    .views
                    .get(parent)
                    .map(|v| v.children.clone())
                    .unwrap_or_default();
                for dropped in previous.iter().filter(|k| !pushed.contains(k)) {
                    self.remove_subtree(dropped);
                }
                for key in pushed {
                    if !self.views.contains_key(key) {
                        self.install(key, Some(parent));
                    }
                }
                if let Some(view) = self.views.get_mut(parent) {
                    view.children = pushed.to_vec();
                    if view.active.as_ref().is_some_and(|a| !pushed.contains(a)) {
                        view.active = None;
                    }
                }
            }
            None => {
                if let Some(old_root) = self.root.clone() {
                    if pushed.first() != Some(&old_root) {
                        self.remove_subtree(&old_root);
                    }
                }
                if let Some(new_root) = pushed.first() {
                    if !self.views.contains_key(new_root) {
                        self.install(new_root, None);
                    }
                    self.root = Some(new_root.clone());
                }
            }
        }

        debug!(
            parent = parent.map_or("<top>", NodeKey::as_str),
            popped = popped.len(),
            children = pushed.len(),
            "changed views"
        );
        Ok(())
    }

    fn changed_active_child(
        &mut self,
        parent: &NodeKey,
        active: Option<&NodeKey>,
    ) -> RenderResult<()> {
        let Some(view) = self.views.get(parent) else {
            return self.reject(RenderError::UnknownNode(parent.clone()));
        };
        if let Some(active) = active {
            if !view.children.contains(active) {
                return self.reject(RenderError::NotAChild {
                    parent: parent.clone(),
                    node: active.clone(),
                });
            }
        }

        if let Some(view) = self.views.get_mut(parent) {
            view.active = active.cloned();
        }
        debug!(%parent, active = active.map_or("-", NodeKey::as_str), "changed active view");
        Ok(())
    }
}
