//! Snapshot diff: compare two navigation trees and produce ordered actions.
//!
//! Nodes are matched by key anywhere in the other tree; a node's position
//! among its siblings is never a diff signal. Removals are collected in
//! post-order and insertions in pre-order, then insertions are grouped by
//! parent: a lone insertion stays a `Push`, anything else under that parent
//! becomes one `Changed` that also absorbs the parent's removals.
//!
//! Grouping is by immediate parent only. When an ancestor is removed, actions
//! for its removed descendants are still reported.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use navtree_tree::{NavNode, NavTree};
use navtree_types::NodeKey;

use crate::action::{DiffAction, NavDiff};

/// Parent key of a node; `None` is the top level.
type ParentKey<'t> = Option<&'t NodeKey>;

/// Compare two snapshots and produce the actions that turn `last` into
/// `current`.
///
/// Either side may be `None` (an empty tree). Neither tree is modified, and
/// the same inputs always produce the same output. The result holds the
/// standalone pops, then pushes and batched changes in order of each
/// parent's first insertion, then active-child changes.
pub fn diff_trees(last: Option<&NavTree>, current: Option<&NavTree>) -> NavDiff {
    let nodes_to_pop: Vec<NavNode<'_>> = match last {
        Some(tree) => tree
            .post_order()
            .into_iter()
            .filter(|n| !contains(current, n.key()))
            .collect(),
        None => Vec::new(),
    };
    let nodes_to_push: Vec<NavNode<'_>> = match current {
        Some(tree) => tree
            .pre_order()
            .filter(|n| !contains(last, n.key()))
            .collect(),
        None => Vec::new(),
    };

    let (push_parents, pushes_by_parent) = group_by_parent(&nodes_to_push);
    let (_, pops_by_parent) = group_by_parent(&nodes_to_pop);

    let mut structure = Vec::with_capacity(push_parents.len());
    let mut absorbed: HashSet<&NodeKey> = HashSet::new();

    for parent in push_parents {
        let pushes = &pushes_by_parent[&parent];
        let pops = pops_by_parent.get(&parent).map(Vec::as_slice).unwrap_or_default();

        if let ([only], []) = (pushes.as_slice(), pops) {
            structure.push(DiffAction::Push {
                node: only.key().clone(),
                parent: parent.cloned(),
            });
            continue;
        }

        absorbed.extend(pops.iter().map(|n| n.key()));
        structure.push(DiffAction::Changed {
            parent: parent.cloned(),
            popped: pops.iter().map(|n| n.key().clone()).collect(),
            pushed: current_children(current, parent),
        });
    }

    let mut actions: Vec<DiffAction> = nodes_to_pop
        .iter()
        .filter(|n| !absorbed.contains(n.key()))
        .map(|n| DiffAction::Pop {
            node: n.key().clone(),
            parent: n.parent_key().cloned(),
        })
        .collect();
    let standalone_pops = actions.len();

    actions.extend(structure);

    if let (Some(last), Some(current)) = (last, current) {
        actions.extend(active_changes(last, current));
    }

    debug!(
        popped = nodes_to_pop.len(),
        pushed = nodes_to_push.len(),
        standalone_pops,
        actions = actions.len(),
        "diffed navigation trees"
    );

    NavDiff { actions }
}

fn contains(tree: Option<&NavTree>, key: &NodeKey) -> bool {
    tree.is_some_and(|t| t.contains(key.as_str()))
}

/// Group nodes by parent key, keeping each group in input order.
///
/// Returns the distinct parents in order of first appearance alongside the
/// groups themselves.
fn group_by_parent<'t>(
    nodes: &[NavNode<'t>],
) -> (Vec<ParentKey<'t>>, HashMap<ParentKey<'t>, Vec<NavNode<'t>>>) {
    let mut order = Vec::new();
    let mut groups: HashMap<ParentKey<'t>, Vec<NavNode<'t>>> = HashMap::new();

    for node in nodes {
        let parent = node.parent_key();
        groups
            .entry(parent)
            .or_insert_with(|| {
                order.push(parent);
                Vec::new()
            })
            .push(*node);
    }

    (order, groups)
}

/// The full current child list of `parent`. The top level's only child is
/// the current root.
fn current_children(current: Option<&NavTree>, parent: ParentKey<'_>) -> Vec<NodeKey> {
    let Some(tree) = current else {
        return Vec::new();
    };
    match parent {
        Some(key) => tree
            .get(key.as_str())
            .map(|n| n.child_keys())
            .unwrap_or_default(),
        None => vec![tree.root().key().clone()],
    }
}

/// Active-child changes for every node present in both trees, in the
/// current tree's pre-order.
fn active_changes(last: &NavTree, current: &NavTree) -> Vec<DiffAction> {
    current
        .pre_order()
        .filter_map(|node| {
            let previous = last.get(node.key().as_str())?;
            let was = previous.active_child().map(|n| n.key());
            let now = node.active_child().map(|n| n.key());
            (was != now).then(|| DiffAction::ChangedActiveChild {
                parent: node.key().clone(),
                active: now.cloned(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use navtree_types::NodeDef;
    use proptest::prelude::*;

    fn key(s: &str) -> NodeKey {
        NodeKey::new(s).unwrap()
    }

    fn keys(list: &[&str]) -> Vec<NodeKey> {
        list.iter().map(|s| key(s)).collect()
    }

    fn tree(def: NodeDef) -> NavTree {
        NavTree::build(&def).unwrap()
    }

    fn push(node: &str, parent: &str) -> DiffAction {
        DiffAction::Push { node: key(node), parent: Some(key(parent)) }
    }

    fn pop(node: &str, parent: &str) -> DiffAction {
        DiffAction::Pop { node: key(node), parent: Some(key(parent)) }
    }

    fn changed(parent: &str, popped: &[&str], pushed: &[&str]) -> DiffAction {
        DiffAction::Changed {
            parent: Some(key(parent)),
            popped: keys(popped),
            pushed: keys(pushed),
        }
    }

    fn activate(parent: &str, active: &str) -> DiffAction {
        DiffAction::ChangedActiveChild { parent: key(parent), active: Some(key(active)) }
    }

    #[test]
    fn both_absent_is_empty() {
        assert!(diff_trees(None, None).is_empty());
    }

    #[test]
    fn identical_trees_no_actions() {
        let t = tree(
            NodeDef::new("root")
                .child(NodeDef::new("a").active().child(NodeDef::new("a1")))
                .child(NodeDef::new("b")),
        );
        assert!(diff_trees(Some(&t), Some(&t)).is_empty());

        let twin = t.clone();
        assert!(diff_trees(Some(&t), Some(&twin)).is_empty());
    }

    #[test]
    fn same_shape_different_active_only_reports_focus() {
        let last = tree(NodeDef::new("root").child(NodeDef::new("a").active()).child(NodeDef::new("b")));
        let current = tree(NodeDef::new("root").child(NodeDef::new("a")).child(NodeDef::new("b").active()));

        let diff = diff_trees(Some(&last), Some(&current));
        assert_eq!(diff.actions, vec![activate("root", "b")]);
    }

    #[test]
    fn single_push() {
        let last = tree(NodeDef::new("root").child(NodeDef::new("A").active()));
        let current = tree(
            NodeDef::new("root")
                .child(NodeDef::new("A").active())
                .child(NodeDef::new("B")),
        );

        let diff = diff_trees(Some(&last), Some(&current));
        assert_eq!(diff.actions, vec![push("B", "root")]);
    }

    #[test]
    fn single_pop() {
        let last = tree(
            NodeDef::new("root")
                .child(NodeDef::new("A").active())
                .child(NodeDef::new("B")),
        );
        let current = tree(NodeDef::new("root").child(NodeDef::new("A").active()));

        let diff = diff_trees(Some(&last), Some(&current));
        assert_eq!(diff.actions, vec![pop("B", "root")]);
    }

    #[test]
    fn push_and_pop_under_same_parent_become_changed() {
        let last = tree(
            NodeDef::new("root")
                .child(NodeDef::new("A"))
                .child(NodeDef::new("B").active()),
        );
        let current = tree(
            NodeDef::new("root")
                .child(NodeDef::new("A"))
                .child(NodeDef::new("C").active()),
        );

        let diff = diff_trees(Some(&last), Some(&current));
        assert_eq!(
            diff.actions,
            vec![changed("root", &["B"], &["A", "C"]), activate("root", "C")]
        );
    }

    #[test]
    fn tab_switch_reports_only_active_change() {
        let tabs = |active: usize| {
            let mut def = NodeDef::new("tabs");
            for (i, name) in ["Tab1", "Tab2", "Tab3"].iter().enumerate() {
                let child = NodeDef::new(*name);
                def = def.child(if i == active { child.active() } else { child });
            }
            tree(def)
        };

        let diff = diff_trees(Some(&tabs(0)), Some(&tabs(1)));
        assert_eq!(diff.actions, vec![activate("tabs", "Tab2")]);
    }

    #[test]
    fn clearing_active_child_reports_none() {
        let last = tree(NodeDef::new("root").child(NodeDef::new("a").active()));
        let current = tree(NodeDef::new("root").child(NodeDef::new("a")));

        let diff = diff_trees(Some(&last), Some(&current));
        assert_eq!(
            diff.actions,
            vec![DiffAction::ChangedActiveChild { parent: key("root"), active: None }]
        );
    }

    #[test]
    fn multiple_pushes_under_one_parent_become_changed() {
        let last = tree(NodeDef::new("root").child(NodeDef::new("a")));
        let current = tree(
            NodeDef::new("root")
                .child(NodeDef::new("x"))
                .child(NodeDef::new("a"))
                .child(NodeDef::new("y")),
        );

        let diff = diff_trees(Some(&last), Some(&current));
        assert_eq!(diff.actions, vec![changed("root", &[], &["x", "a", "y"])]);
    }

    #[test]
    fn reorder_alone_is_not_a_change() {
        let last = tree(
            NodeDef::new("root")
                .child(NodeDef::new("a"))
                .child(NodeDef::new("b").active())
                .child(NodeDef::new("c")),
        );
        let current = tree(
            NodeDef::new("root")
                .child(NodeDef::new("c"))
                .child(NodeDef::new("a"))
                .child(NodeDef::new("b").active()),
        );

        assert!(diff_trees(Some(&last), Some(&current)).is_empty());
    }

    #[test]
    fn moved_node_is_not_pushed_or_popped() {
        let last = tree(
            NodeDef::new("root")
                .child(NodeDef::new("a").child(NodeDef::new("detail")))
                .child(NodeDef::new("b")),
        );
        let current = tree(
            NodeDef::new("root")
                .child(NodeDef::new("a"))
                .child(NodeDef::new("b").child(NodeDef::new("detail"))),
        );

        assert!(diff_trees(Some(&last), Some(&current)).is_empty());
    }

    #[test]
    fn nested_pushes_report_parent_first() {
        let last = tree(NodeDef::new("root").child(NodeDef::new("a")));
        let current = tree(
            NodeDef::new("root")
                .child(NodeDef::new("a"))
                .child(NodeDef::new("b").child(NodeDef::new("b1").child(NodeDef::new("b2")))),
        );

        let diff = diff_trees(Some(&last), Some(&current));
        assert_eq!(
            diff.actions,
            vec![push("b", "root"), push("b1", "b"), push("b2", "b1")]
        );
    }

    #[test]
    fn nested_pops_report_child_first() {
        let last = tree(
            NodeDef::new("root")
                .child(NodeDef::new("a"))
                .child(NodeDef::new("b").child(NodeDef::new("b1").child(NodeDef::new("b2")))),
        );
        let current = tree(NodeDef::new("root").child(NodeDef::new("a")));

        let diff = diff_trees(Some(&last), Some(&current));
        assert_eq!(
            diff.actions,
            vec![pop("b2", "b1"), pop("b1", "b"), pop("b", "root")]
        );
    }

    #[test]
    fn changed_pops_follow_post_order_restricted_to_parent() {
        let last = tree(
            NodeDef::new("root")
                .child(NodeDef::new("p").child(NodeDef::new("p1")))
                .child(NodeDef::new("keep"))
                .child(NodeDef::new("q")),
        );
        let current = tree(
            NodeDef::new("root")
                .child(NodeDef::new("keep"))
                .child(NodeDef::new("new")),
        );

        let diff = diff_trees(Some(&last), Some(&current));
        assert_eq!(
            diff.actions,
            vec![
                pop("p1", "p"),
                changed("root", &["p", "q"], &["keep", "new"]),
            ]
        );
    }

    #[test]
    fn non_contiguous_pushes_form_one_changed() {
        let last = tree(
            NodeDef::new("root")
                .child(NodeDef::new("a"))
                .child(NodeDef::new("b")),
        );
        let current = tree(
            NodeDef::new("root")
                .child(NodeDef::new("x"))
                .child(NodeDef::new("a"))
                .child(NodeDef::new("b"))
                .child(NodeDef::new("y")),
        );

        let diff = diff_trees(Some(&last), Some(&current));
        assert_eq!(diff.changes(), 1);
        assert_eq!(diff.actions, vec![changed("root", &[], &["x", "a", "b", "y"])]);
    }

    #[test]
    fn structural_groups_follow_first_push_order() {
        let last = tree(
            NodeDef::new("root")
                .child(NodeDef::new("a"))
                .child(NodeDef::new("b").child(NodeDef::new("old"))),
        );
        let current = tree(
            NodeDef::new("root")
                .child(NodeDef::new("a").child(NodeDef::new("a1")))
                .child(NodeDef::new("b").child(NodeDef::new("new")))
                .child(NodeDef::new("c")),
        );

        let diff = diff_trees(Some(&last), Some(&current));
        assert_eq!(
            diff.actions,
            vec![
                push("a1", "a"),
                changed("b", &["old"], &["new"]),
                push("c", "root"),
            ]
        );
    }

    #[test]
    fn ancestor_removal_keeps_descendant_actions() {
        // Grouping is per immediate parent: removing `A` does not silence the
        // report for its removed child, nor does a new `B` silence its child.
        let last = tree(NodeDef::new("root").child(NodeDef::new("A").child(NodeDef::new("A1"))));
        let current = tree(NodeDef::new("root").child(NodeDef::new("B").child(NodeDef::new("B1"))));

        let diff = diff_trees(Some(&last), Some(&current));
        assert_eq!(
            diff.actions,
            vec![
                pop("A1", "A"),
                changed("root", &["A"], &["B"]),
                push("B1", "B"),
            ]
        );
    }

    #[test]
    fn from_nothing_pushes_root_then_descendants() {
        let current = tree(
            NodeDef::new("root")
                .child(NodeDef::new("a").active())
                .child(NodeDef::new("b")),
        );

        let diff = diff_trees(None, Some(&current));
        assert_eq!(
            diff.actions,
            vec![
                DiffAction::Push { node: key("root"), parent: None },
                changed("root", &[], &["a", "b"]),
            ]
        );
    }

    #[test]
    fn to_nothing_pops_everything_post_order() {
        let last = tree(NodeDef::new("root").child(NodeDef::new("a").child(NodeDef::new("a1"))));

        let diff = diff_trees(Some(&last), None);
        assert_eq!(
            diff.actions,
            vec![
                pop("a1", "a"),
                pop("a", "root"),
                DiffAction::Pop { node: key("root"), parent: None },
            ]
        );
    }

    #[test]
    fn replaced_root_is_a_top_level_change() {
        let last = tree(NodeDef::new("login"));
        let current = tree(NodeDef::new("main"));

        let diff = diff_trees(Some(&last), Some(&current));
        assert_eq!(
            diff.actions,
            vec![DiffAction::Changed {
                parent: None,
                popped: keys(&["login"]),
                pushed: keys(&["main"]),
            }]
        );
    }

    #[test]
    fn pops_precede_structure_precedes_focus() {
        let last = tree(
            NodeDef::new("root")
                .child(NodeDef::new("left").child(NodeDef::new("gone")))
                .child(NodeDef::new("right").active()),
        );
        let current = tree(
            NodeDef::new("root")
                .child(NodeDef::new("left").active())
                .child(NodeDef::new("right").child(NodeDef::new("fresh"))),
        );

        let diff = diff_trees(Some(&last), Some(&current));
        assert_eq!(
            diff.actions,
            vec![
                pop("gone", "left"),
                push("fresh", "right"),
                activate("root", "left"),
            ]
        );
        assert!(diff.is_phase_ordered());
    }

    #[test]
    fn inputs_are_not_mutated() {
        let last = tree(
            NodeDef::new("root")
                .child(NodeDef::new("a").active().child(NodeDef::new("a1")))
                .child(NodeDef::new("b")),
        );
        let current = tree(
            NodeDef::new("root")
                .child(NodeDef::new("b").active())
                .child(NodeDef::new("c")),
        );
        let last_before = last.clone();
        let current_before = current.clone();

        let first = diff_trees(Some(&last), Some(&current));
        let second = diff_trees(Some(&last), Some(&current));

        assert_eq!(last, last_before);
        assert_eq!(current, current_before);
        assert_eq!(first, second);
    }

    // ---------------------------------------------------------------
    // Property tests
    // ---------------------------------------------------------------

    /// Build a snapshot over keys `n0..nN`. Node `i > 0` hangs under
    /// `parents[i] % i` when `include[i]` holds and its parent is present;
    /// `active[i]` picks the active child (or none).
    fn snapshot(parents: &[usize], include: &[bool], active: &[usize]) -> NavTree {
        let n = parents.len();
        let mut present = vec![false; n];
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
        present[0] = true;
        for i in 1..n {
            let parent = parents[i] % i;
            present[i] = include[i] && present[parent];
            if present[i] {
                children[parent].push(i);
            }
        }

        fn def(i: usize, children: &[Vec<usize>], active: &[usize]) -> NodeDef {
            let kids = &children[i];
            let pick = active[i] % (kids.len() + 1);
            let mut node = NodeDef::new(format!("n{i}"));
            for (j, &c) in kids.iter().enumerate() {
                let child = def(c, children, active);
                node = node.child(if j + 1 == pick { child.active() } else { child });
            }
            node
        }

        NavTree::build(&def(0, &children, active)).unwrap()
    }

    prop_compose! {
        fn tree_pair()(n in 2usize..14)(
            parents_a in proptest::collection::vec(any::<usize>(), n),
            parents_b in proptest::collection::vec(any::<usize>(), n),
            include_a in proptest::collection::vec(any::<bool>(), n),
            include_b in proptest::collection::vec(any::<bool>(), n),
            active_a in proptest::collection::vec(any::<usize>(), n),
            active_b in proptest::collection::vec(any::<usize>(), n),
            shared_hierarchy in any::<bool>(),
        ) -> (NavTree, NavTree) {
            let parents_b = if shared_hierarchy { parents_a.clone() } else { parents_b };
            (
                snapshot(&parents_a, &include_a, &active_a),
                snapshot(&parents_b, &include_b, &active_b),
            )
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn diff_is_deterministic_and_pure((last, current) in tree_pair()) {
            let last_before = last.clone();
            let current_before = current.clone();

            let first = diff_trees(Some(&last), Some(&current));
            let second = diff_trees(Some(&last), Some(&current));

            prop_assert_eq!(&first, &second);
            prop_assert_eq!(last, last_before);
            prop_assert_eq!(current, current_before);
        }

        #[test]
        fn output_is_phase_ordered((last, current) in tree_pair()) {
            let diff = diff_trees(Some(&last), Some(&current));
            prop_assert!(diff.is_phase_ordered());
        }

        #[test]
        fn self_diff_is_empty((tree, _) in tree_pair()) {
            prop_assert!(diff_trees(Some(&tree), Some(&tree)).is_empty());
        }

        #[test]
        fn every_removed_and_added_key_is_reported((last, current) in tree_pair()) {
            let diff = diff_trees(Some(&last), Some(&current));

            let mut popped = HashSet::new();
            let mut pushed = HashSet::new();
            for action in &diff {
                match action {
                    DiffAction::Pop { node, .. } => { popped.insert(node.clone()); }
                    DiffAction::Push { node, .. } => { pushed.insert(node.clone()); }
                    DiffAction::Changed { popped: p, pushed: q, .. } => {
                        popped.extend(p.iter().cloned());
                        pushed.extend(q.iter().cloned());
                    }
                    DiffAction::ChangedActiveChild { .. } => {}
                }
            }

            for node in last.pre_order() {
                if !current.contains(node.key().as_str()) {
                    prop_assert!(popped.contains(node.key()), "missing pop for {}", node.key());
                }
            }
            for node in current.pre_order() {
                if !last.contains(node.key().as_str()) {
                    prop_assert!(pushed.contains(node.key()), "missing push for {}", node.key());
                }
            }
        }

        #[test]
        fn active_changes_only_for_shared_nodes((last, current) in tree_pair()) {
            let diff = diff_trees(Some(&last), Some(&current));
            for action in &diff {
                if let DiffAction::ChangedActiveChild { parent, active } = action {
                    prop_assert!(last.contains(parent.as_str()));
                    let node = current.get(parent.as_str()).unwrap();
                    prop_assert_eq!(node.active_child().map(|n| n.key()), active.as_ref());
                }
            }
        }
    }
}
