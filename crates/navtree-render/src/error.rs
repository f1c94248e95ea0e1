//! Error types for rendering.

use navtree_types::NodeKey;

/// Errors raised by [`ViewHierarchy`](crate::ViewHierarchy) in strict mode.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// An action referenced a node the hierarchy does not contain.
    #[error("unknown node: {0}")]
    UnknownNode(NodeKey),

    /// An action targeted a parent the hierarchy does not contain.
    #[error("unknown parent: {0}")]
    UnknownParent(NodeKey),

    /// A push would create a node that already exists.
    #[error("node already present: {0}")]
    DuplicateNode(NodeKey),

    /// An active-child change pointed at a node that is not a child.
    #[error("{node} is not a child of {parent}")]
    NotAChild { parent: NodeKey, node: NodeKey },

    /// A changed child list named an existing node that lives elsewhere.
    #[error("{node} already lives under {}", .current.as_ref().map_or("<top>", NodeKey::as_str))]
    ForeignNode {
        node: NodeKey,
        current: Option<NodeKey>,
    },

    /// A top-level push arrived while a root is installed.
    #[error("root already installed: {0}")]
    RootOccupied(NodeKey),

    /// A top-level change listed more than one root.
    #[error("top level can hold one root, got {0}")]
    MultipleRoots(usize),
}

/// Convenience alias for render results.
pub type RenderResult<T> = Result<T, RenderError>;
