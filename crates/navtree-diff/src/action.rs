//! Diff actions and the ordered diff result.

use std::fmt;

use serde::{Deserialize, Serialize};

use navtree_types::NodeKey;

/// A single edit that moves a view hierarchy toward the current snapshot.
///
/// `parent: None` denotes the top level, i.e. the action concerns a root.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiffAction {
    /// One node appeared under `parent`, with nothing removed there.
    Push {
        node: NodeKey,
        parent: Option<NodeKey>,
    },
    /// One node disappeared from under `parent`.
    Pop {
        node: NodeKey,
        parent: Option<NodeKey>,
    },
    /// Several nodes appeared under `parent`, or nodes both appeared and
    /// disappeared there. `pushed` is the parent's full current child list.
    Changed {
        parent: Option<NodeKey>,
        popped: Vec<NodeKey>,
        pushed: Vec<NodeKey>,
    },
    /// The active child of `parent` changed; `None` means focus was cleared.
    ChangedActiveChild {
        parent: NodeKey,
        active: Option<NodeKey>,
    },
}

/// Output phases, in the order they appear in a [`NavDiff`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiffPhase {
    /// Standalone removals.
    Teardown,
    /// Insertions and batched changes.
    Structure,
    /// Active-child re-pointing.
    Focus,
}

impl DiffAction {
    /// Which output phase this action belongs to.
    pub fn phase(&self) -> DiffPhase {
        match self {
            Self::Pop { .. } => DiffPhase::Teardown,
            Self::Push { .. } | Self::Changed { .. } => DiffPhase::Structure,
            Self::ChangedActiveChild { .. } => DiffPhase::Focus,
        }
    }

    /// Short lowercase name of the action kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Push { .. } => "push",
            Self::Pop { .. } => "pop",
            Self::Changed { .. } => "changed",
            Self::ChangedActiveChild { .. } => "changed_active_child",
        }
    }
}

fn top_level(parent: &Option<NodeKey>) -> &str {
    parent.as_ref().map_or("<top>", NodeKey::as_str)
}

fn join(keys: &[NodeKey]) -> String {
    keys.iter().map(NodeKey::as_str).collect::<Vec<_>>().join(", ")
}

impl fmt::Display for DiffAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Push { node, parent } => write!(f, "push {node} onto {}", top_level(parent)),
            Self::Pop { node, parent } => write!(f, "pop {node} from {}", top_level(parent)),
            Self::Changed {
                parent,
                popped,
                pushed,
            } => write!(
                f,
                "changed {}: popped [{}], children [{}]",
                top_level(parent),
                join(popped),
                join(pushed)
            ),
            Self::ChangedActiveChild { parent, active } => match active {
                Some(active) => write!(f, "activate {active} under {parent}"),
                None => write!(f, "clear active child of {parent}"),
            },
        }
    }
}

/// The ordered result of diffing two snapshots.
///
/// Actions are sorted by [`DiffPhase`]: standalone pops, then pushes and
/// batched changes, then active-child changes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavDiff {
    /// The actions, in the order they must be applied.
    pub actions: Vec<DiffAction>,
}

impl NavDiff {
    /// Create an empty diff.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if there are no actions.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Number of actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Iterate over the actions in order.
    pub fn iter(&self) -> std::slice::Iter<'_, DiffAction> {
        self.actions.iter()
    }

    /// Number of standalone `Pop` actions.
    pub fn pops(&self) -> usize {
        self.count(|a| matches!(a, DiffAction::Pop { .. }))
    }

    /// Number of standalone `Push` actions.
    pub fn pushes(&self) -> usize {
        self.count(|a| matches!(a, DiffAction::Push { .. }))
    }

    /// Number of `Changed` actions.
    pub fn changes(&self) -> usize {
        self.count(|a| matches!(a, DiffAction::Changed { .. }))
    }

    /// Number of `ChangedActiveChild` actions.
    pub fn active_changes(&self) -> usize {
        self.count(|a| matches!(a, DiffAction::ChangedActiveChild { .. }))
    }

    /// Returns `true` if the actions are sorted by phase.
    pub fn is_phase_ordered(&self) -> bool {
        self.actions
            .windows(2)
            .all(|w| w[0].phase() <= w[1].phase())
    }

    /// Consume the diff, returning its actions.
    pub fn into_actions(self) -> Vec<DiffAction> {
        self.actions
    }

    fn count(&self, pred: impl Fn(&DiffAction) -> bool) -> usize {
        self.actions.iter().filter(|a| pred(a)).count()
    }
}

impl<'a> IntoIterator for &'a NavDiff {
    type Item = &'a DiffAction;
    type IntoIter = std::slice::Iter<'a, DiffAction>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.iter()
    }
}
