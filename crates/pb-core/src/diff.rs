//! Version comparison between two component trees.
//!
//! Both trees are flattened into id → node maps and compared id by id.
//! Comparison is shallow per node: `children` counts as one field, so a
//! change anywhere below a node also marks that node as modified on
//! `children`, alongside the added/removed entries for the descendants.

use crate::id::NodeId;
use crate::model::Component;
use crate::tree::preorder;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Field names that differ for one id present in both trees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifiedEntry {
    pub id: NodeId,
    /// Sorted field names (`type`, `children`, or a prop key).
    pub keys: Vec<String>,
}

/// Added/removed/modified delta from `a` (current) to `b` (selected).
///
/// Id lists follow document order of the tree they come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffSummary {
    pub added: usize,
    pub added_ids: Vec<NodeId>,
    pub removed: usize,
    pub removed_ids: Vec<NodeId>,
    pub modified: usize,
    pub modified_list: Vec<ModifiedEntry>,
    /// Flattened current tree.
    pub a: HashMap<NodeId, Component>,
    /// Flattened selected tree.
    pub b: HashMap<NodeId, Component>,
}

impl DiffSummary {
    /// Whether the two trees are equal node for node.
    pub fn is_empty(&self) -> bool {
        self.added == 0 && self.removed == 0 && self.modified == 0
    }

    /// Changed field names for `id`, if it was modified.
    pub fn modified_keys(&self, id: NodeId) -> Option<&[String]> {
        self.modified_list
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.keys.as_slice())
    }
}

/// Compare `current` against `selected`. `None` when there is nothing to
/// compare against.
pub fn compute_diff_summary(current: &[Component], selected: Option<&[Component]>) -> Option<DiffSummary> {
    let selected = selected?;
    let a_order = preorder(current);
    let b_order = preorder(selected);
    let a: HashMap<NodeId, Component> = a_order.iter().map(|n| (n.id, (*n).clone())).collect();
    let b: HashMap<NodeId, Component> = b_order.iter().map(|n| (n.id, (*n).clone())).collect();

    let added_ids: Vec<NodeId> = b_order
        .iter()
        .map(|n| n.id)
        .filter(|id| !a.contains_key(id))
        .collect();
    let removed_ids: Vec<NodeId> = a_order
        .iter()
        .map(|n| n.id)
        .filter(|id| !b.contains_key(id))
        .collect();
    let modified_list: Vec<ModifiedEntry> = a_order
        .iter()
        .filter_map(|old| {
            let new = b.get(&old.id)?;
            let keys = changed_keys(old, new);
            (!keys.is_empty()).then_some(ModifiedEntry { id: old.id, keys })
        })
        .collect();

    log::debug!(
        "DIFF +{} -{} ~{}",
        added_ids.len(),
        removed_ids.len(),
        modified_list.len()
    );
    Some(DiffSummary {
        added: added_ids.len(),
        added_ids,
        removed: removed_ids.len(),
        removed_ids,
        modified: modified_list.len(),
        modified_list,
        a,
        b,
    })
}

/// Own fields that differ between two versions of the same node.
fn changed_keys(old: &Component, new: &Component) -> Vec<String> {
    let mut keys = BTreeSet::new();
    if old.kind != new.kind {
        keys.insert("type".to_string());
    }
    if old.children != new.children {
        keys.insert("children".to_string());
    }
    for key in old.props.keys().chain(new.props.keys()) {
        if old.props.get(key) != new.props.get(key) {
            keys.insert(key.clone());
        }
    }
    keys.into_iter().collect()
}

// ─── Selective revert ────────────────────────────────────────────────────

/// Substitute `replacement` for the node with `id`, at the same parent and
/// index. Unchanged when `id` is not in the tree.
pub fn replace_component_by_id(tree: &[Component], id: NodeId, replacement: &Component) -> Vec<Component> {
    tree.iter()
        .map(|node| {
            if node.id == id {
                replacement.clone()
            } else {
                match &node.children {
                    Some(children) => Component {
                        children: Some(replace_component_by_id(children, id, replacement)),
                        ..node.clone()
                    },
                    None => node.clone(),
                }
            }
        })
        .collect()
}

/// Revert one modified node of `current` to its version in the compared
/// tree. Unchanged when `id` is not present on both sides.
pub fn revert_component(current: &[Component], summary: &DiffSummary, id: NodeId) -> Vec<Component> {
    match (summary.a.contains_key(&id), summary.b.get(&id)) {
        (true, Some(saved)) => {
            log::debug!("REVERT {id}");
            replace_component_by_id(current, id, saved)
        }
        _ => {
            log::warn!("REVERT skipped: {id} is not in both versions");
            current.to_vec()
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn id(s: &str) -> NodeId {
        NodeId::intern(s)
    }

    #[test]
    fn identical_trees_have_empty_diff() {
        let tree = vec![Component::container(
            "root",
            "Section",
            vec![Component::new("a", "Text").with_prop("text", "hi")],
        )];
        let d = compute_diff_summary(&tree, Some(&tree)).unwrap();
        assert!(d.is_empty());
        assert_eq!(d.a.len(), 2);
        assert_eq!(d.a, d.b);
    }

    #[test]
    fn missing_selection_gives_none() {
        assert!(compute_diff_summary(&[Component::new("a", "Text")], None).is_none());
    }

    #[test]
    fn type_change_is_a_modified_key() {
        let a = vec![Component::new("x", "Text")];
        let b = vec![Component::new("x", "Heading")];
        let d = compute_diff_summary(&a, Some(&b)).unwrap();
        assert_eq!(d.modified_keys(id("x")), Some(&["type".to_string()][..]));
    }

    #[test]
    fn removed_prop_counts() {
        let a = vec![Component::new("x", "Text").with_prop("href", "/a")];
        let b = vec![Component::new("x", "Text")];
        let d = compute_diff_summary(&a, Some(&b)).unwrap();
        assert_eq!(d.modified, 1);
        assert_eq!(d.modified_list[0].keys, vec!["href".to_string()]);
    }

    #[test]
    fn replace_keeps_position() {
        let tree = vec![Component::container(
            "s",
            "Section",
            vec![Component::new("p", "Text"), Component::new("q", "Text")],
        )];
        let replacement = Component::new("p", "Text").with_prop("text", "old");
        let out = replace_component_by_id(&tree, id("p"), &replacement);
        assert_eq!(out[0].children()[0], replacement);
        assert_eq!(out[0].children()[1].id, id("q"));
        assert_eq!(replace_component_by_id(&tree, id("zz"), &replacement), tree);
    }

    #[test]
    fn revert_only_touches_target() {
        let current = vec![
            Component::new("a", "Text").with_prop("text", "new a"),
            Component::new("b", "Text").with_prop("text", "new b"),
        ];
        let saved = vec![
            Component::new("a", "Text").with_prop("text", "old a"),
            Component::new("b", "Text").with_prop("text", "old b"),
        ];
        let d = compute_diff_summary(&current, Some(&saved)).unwrap();
        let out = revert_component(&current, &d, id("a"));
        assert_eq!(out[0].prop("text").unwrap(), "old a");
        assert_eq!(out[1].prop("text").unwrap(), "new b");
    }
}
