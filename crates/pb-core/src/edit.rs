//! Structural edits over component trees.
//!
//! Every function takes the current tree by reference and returns a brand
//! new tree; the input is never touched, so history snapshots stay valid.
//! Requests naming stale ids resolve to an unchanged copy plus a `warn!`.

use crate::error::GroupError;
use crate::id::NodeId;
use crate::model::{Component, kinds, props};
use crate::tree::{Location, collect_ids, find_by_id, locate, preorder, subtree_contains};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Fewest siblings `group_into_container` will wrap.
pub const DEFAULT_MIN_GROUP_SIZE: usize = 2;

// ─── Owned-tree helpers ──────────────────────────────────────────────────

fn find_mut(list: &mut [Component], id: NodeId) -> Option<&mut Component> {
    for node in list.iter_mut() {
        if node.id == id {
            return Some(node);
        }
        if let Some(children) = node.children.as_mut()
            && let Some(found) = find_mut(children, id)
        {
            return Some(found);
        }
    }
    None
}

/// The child list addressed by `parent` inside an owned tree.
fn list_mut(tree: &mut Vec<Component>, parent: Option<NodeId>) -> Option<&mut Vec<Component>> {
    match parent {
        None => Some(tree),
        Some(id) => find_mut(tree, id).and_then(|node| node.children.as_mut()),
    }
}

/// Fresh id prefix for a component type, e.g. `MultiColumn` → `multicolumn`.
fn id_prefix(kind: &str) -> String {
    kind.to_ascii_lowercase()
}

// ─── Insert / remove / move ──────────────────────────────────────────────

/// Insert `component` into `parent`'s child list (`None` = root) at
/// `index`, clamped to the list length.
///
/// Unchanged when the parent is unknown or is a leaf, or when any id in
/// `component` already exists in the tree.
pub fn insert_component(
    tree: &[Component],
    parent: Option<NodeId>,
    index: usize,
    component: Component,
) -> Vec<Component> {
    let existing: HashSet<NodeId> = collect_ids(tree).into_iter().collect();
    if let Some(clash) = preorder(std::slice::from_ref(&component))
        .into_iter()
        .find(|node| existing.contains(&node.id))
    {
        log::warn!("INSERT skipped: id {} already in tree", clash.id);
        return tree.to_vec();
    }

    let mut next = tree.to_vec();
    match list_mut(&mut next, parent) {
        Some(list) => {
            let at = index.min(list.len());
            log::debug!("INSERT {} at {:?}[{at}]", component.id, parent);
            list.insert(at, component);
            next
        }
        None => {
            log::warn!("INSERT skipped: parent {parent:?} cannot take children");
            tree.to_vec()
        }
    }
}

/// Remove `id` (and its subtree).
pub fn remove_component(tree: &[Component], id: NodeId) -> Vec<Component> {
    let Some(loc) = locate(tree, id) else {
        log::warn!("REMOVE skipped: {id} not found");
        return tree.to_vec();
    };
    let mut next = tree.to_vec();
    if let Some(list) = list_mut(&mut next, loc.parent) {
        list.remove(loc.index);
        log::debug!("REMOVE {id}");
    }
    next
}

/// Move `id` to `to`. `to.index` is read after `id` has been taken out of
/// its old list, and is clamped to that list's length.
///
/// Unchanged when `id` is unknown, the target parent is unknown or a leaf,
/// or the target parent lies inside the moved subtree.
pub fn move_component(tree: &[Component], id: NodeId, to: Location) -> Vec<Component> {
    let Some(node) = find_by_id(tree, id) else {
        log::warn!("MOVE skipped: {id} not found");
        return tree.to_vec();
    };
    if let Some(target) = to.parent {
        if subtree_contains(node, target) {
            log::warn!("MOVE skipped: {target} is inside {id}");
            return tree.to_vec();
        }
        if !find_by_id(tree, target).is_some_and(Component::has_children) {
            log::warn!("MOVE skipped: {target} cannot take children");
            return tree.to_vec();
        }
    }

    let moved = node.clone();
    let mut next = remove_component(tree, id);
    if let Some(list) = list_mut(&mut next, to.parent) {
        let at = to.index.min(list.len());
        list.insert(at, moved);
        log::debug!("MOVE {id} to {:?}[{at}]", to.parent);
    }
    next
}

/// Deep-copy `id` with fresh ids, inserted right after the original.
/// Returns the new tree and the copy's id (`None` when `id` is unknown).
pub fn duplicate_component(tree: &[Component], id: NodeId) -> (Vec<Component>, Option<NodeId>) {
    let (Some(node), Some(loc)) = (find_by_id(tree, id), locate(tree, id)) else {
        log::warn!("DUPLICATE skipped: {id} not found");
        return (tree.to_vec(), None);
    };
    let copy = clone_with_fresh_ids(node);
    let copy_id = copy.id;
    let mut next = tree.to_vec();
    if let Some(list) = list_mut(&mut next, loc.parent) {
        list.insert(loc.index + 1, copy);
        log::debug!("DUPLICATE {id} as {copy_id}");
    }
    (next, Some(copy_id))
}

/// Deep clone of `node` where every id in the subtree is freshly generated.
pub fn clone_with_fresh_ids(node: &Component) -> Component {
    Component {
        id: NodeId::with_prefix(&id_prefix(&node.kind)),
        kind: node.kind.clone(),
        children: node
            .children
            .as_ref()
            .map(|children| children.iter().map(clone_with_fresh_ids).collect()),
        props: node.props.clone(),
    }
}

/// Shallow-merge `patch` into the props of `id`. A `null` value removes
/// the prop. `id`, `type` and `children` keys are ignored.
pub fn update_component(tree: &[Component], id: NodeId, patch: &Map<String, Value>) -> Vec<Component> {
    let mut next = tree.to_vec();
    match find_mut(&mut next, id) {
        Some(node) => {
            for (key, value) in patch {
                if matches!(key.as_str(), "id" | "type" | "children") {
                    continue;
                }
                if value.is_null() {
                    node.props.remove(key);
                } else {
                    node.props.insert(key.clone(), value.clone());
                }
            }
        }
        None => log::warn!("UPDATE skipped: {id} not found"),
    }
    next
}

// ─── Group / ungroup ─────────────────────────────────────────────────────

/// Wrap the `selected` siblings in a new `container_type` node.
///
/// The container takes the position of the first selected sibling, and the
/// grouped nodes keep their document order (not selection order). A
/// `MultiColumn` container gets one column per grouped child.
///
/// Fewer than [`DEFAULT_MIN_GROUP_SIZE`] selected ids, or ids that are not
/// all in `siblings`, leave the list unchanged.
pub fn group_into_container(
    siblings: &[Component],
    selected: &[NodeId],
    container_type: &str,
) -> Vec<Component> {
    let container_id = NodeId::with_prefix(&id_prefix(container_type));
    match try_group_into_container(
        siblings,
        selected,
        container_type,
        container_id,
        DEFAULT_MIN_GROUP_SIZE,
    ) {
        Ok(grouped) => grouped,
        Err(err) => {
            log::warn!("GROUP skipped: {err}");
            siblings.to_vec()
        }
    }
}

/// `group_into_container` with an explicit container id and threshold.
///
/// # Errors
/// `SelectionTooSmall` below `min_size` distinct ids; `NotSiblings` when a
/// selected id is not in `siblings`. Nothing is applied on error.
pub fn try_group_into_container(
    siblings: &[Component],
    selected: &[NodeId],
    container_type: &str,
    container_id: NodeId,
    min_size: usize,
) -> Result<Vec<Component>, GroupError> {
    let wanted: HashSet<NodeId> = selected.iter().copied().collect();
    if wanted.len() < min_size.max(1) {
        return Err(GroupError::SelectionTooSmall {
            got: wanted.len(),
            min: min_size.max(1),
        });
    }
    if let Some(stray) = selected
        .iter()
        .find(|id| !siblings.iter().any(|node| node.id == **id))
    {
        return Err(GroupError::NotSiblings(*stray));
    }

    let mut insert_at = None;
    let mut grouped = Vec::with_capacity(wanted.len());
    let mut rest = Vec::with_capacity(siblings.len() - wanted.len() + 1);
    for node in siblings {
        if wanted.contains(&node.id) {
            insert_at.get_or_insert(rest.len());
            grouped.push(node.clone());
        } else {
            rest.push(node.clone());
        }
    }

    let mut container = Component::container(container_id, container_type, grouped);
    if container_type == kinds::MULTI_COLUMN {
        let columns = container.children().len();
        container = container.with_prop(props::COLUMNS, columns);
    }
    log::debug!(
        "GROUP {} components into {container_type} {container_id}",
        container.children().len()
    );
    rest.insert(insert_at.unwrap_or(0), container);
    Ok(rest)
}

/// Group `selected` wherever they live in `tree`: the common parent is
/// resolved first, then its child list is regrouped in place.
///
/// # Errors
/// As [`try_group_into_container`]; an unknown id or ids under different
/// parents report `NotSiblings`.
pub fn group_in_tree(
    tree: &[Component],
    selected: &[NodeId],
    container_type: &str,
    container_id: NodeId,
    min_size: usize,
) -> Result<Vec<Component>, GroupError> {
    let Some(first) = selected.first() else {
        return Err(GroupError::SelectionTooSmall {
            got: 0,
            min: min_size.max(1),
        });
    };
    let parent = locate(tree, *first)
        .ok_or(GroupError::NotSiblings(*first))?
        .parent;
    for id in selected {
        match locate(tree, *id) {
            Some(loc) if loc.parent == parent => {}
            _ => return Err(GroupError::NotSiblings(*id)),
        }
    }

    let mut next = tree.to_vec();
    let list = list_mut(&mut next, parent).ok_or(GroupError::NotSiblings(*first))?;
    let regrouped = try_group_into_container(list, selected, container_type, container_id, min_size)?;
    *list = regrouped;
    Ok(next)
}

/// Replace container `container_id` by its own children, spliced in at the
/// container's position in whatever list holds it.
///
/// Unchanged when the id is unknown or names a leaf.
pub fn ungroup_container(tree: &[Component], container_id: NodeId) -> Vec<Component> {
    let Some(loc) = locate(tree, container_id) else {
        log::warn!("UNGROUP skipped: {container_id} not found");
        return tree.to_vec();
    };
    let mut next = tree.to_vec();
    let Some(list) = list_mut(&mut next, loc.parent) else {
        return next;
    };
    let Some(children) = list[loc.index].children.take() else {
        log::warn!("UNGROUP skipped: {container_id} has no children list");
        return tree.to_vec();
    };
    log::debug!("UNGROUP {container_id} releasing {} children", children.len());
    let tail = list.split_off(loc.index + 1);
    list.pop();
    list.extend(children);
    list.extend(tail);
    next
}

// ─── Tests ───────────────────────────────────────────────────────────────
