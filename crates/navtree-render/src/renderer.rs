//! The renderer trait and the ordered dispatcher.

use tracing::{debug, debug_span};

use navtree_diff::{DiffAction, NavDiff};
use navtree_types::NodeKey;

/// A consumer of diff actions, typically a UI layer mapping each action onto
/// concrete view operations (presenting, dismissing, swapping tabs).
///
/// `parent: None` addresses the top level, where the root lives.
pub trait NavigationRenderer {
    /// Error returned when an action cannot be applied.
    type Error;

    /// Remove `node` (and everything under it) from `parent`.
    fn pop(&mut self, node: &NodeKey, parent: Option<&NodeKey>) -> Result<(), Self::Error>;

    /// Insert `node` under `parent`.
    fn push(&mut self, node: &NodeKey, parent: Option<&NodeKey>) -> Result<(), Self::Error>;

    /// Remove `popped` from `parent` and install `pushed` as its full child
    /// list.
    fn changed(
        &mut self,
        parent: Option<&NodeKey>,
        popped: &[NodeKey],
        pushed: &[NodeKey],
    ) -> Result<(), Self::Error>;

    /// Point `parent`'s focus at `active`, or clear it.
    fn changed_active_child(
        &mut self,
        parent: &NodeKey,
        active: Option<&NodeKey>,
    ) -> Result<(), Self::Error>;
}

/// Apply every action of `diff` to `renderer`, in order.
///
/// Stops at the first error. Returns the number of actions applied.
pub fn render_diff<R>(diff: &NavDiff, renderer: &mut R) -> Result<usize, R::Error>
where
    R: NavigationRenderer + ?Sized,
{
    let _span = debug_span!("render_diff", actions = diff.len()).entered();

    for (applied, action) in diff.iter().enumerate() {
        debug!(step = applied, %action, "rendering action");
        match action {
            DiffAction::Pop { node, parent } => renderer.pop(node, parent.as_ref())?,
            DiffAction::Push { node, parent } => renderer.push(node, parent.as_ref())?,
            DiffAction::Changed {
                parent,
                popped,
                pushed,
            } => renderer.changed(parent.as_ref(), popped, pushed)?,
            DiffAction::ChangedActiveChild { parent, active } => {
                renderer.changed_active_child(parent, active.as_ref())?
            }
        }
    }

    Ok(diff.len())
}
