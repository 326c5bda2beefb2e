//! Read-only queries over a component tree.
//!
//! Every query is total: an unknown id yields `None` (or an empty slice),
//! never a panic. Callers routinely hold ids that went stale after an undo
//! or while a drag was in flight.

use crate::error::TreeError;
use crate::id::NodeId;
use crate::model::{Component, kinds};
use std::collections::HashSet;

/// Where a component sits: its parent (`None` = root list) and index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub parent: Option<NodeId>,
    pub index: usize,
}

impl Location {
    pub fn root(index: usize) -> Self {
        Self {
            parent: None,
            index,
        }
    }

    pub fn child_of(parent: NodeId, index: usize) -> Self {
        Self {
            parent: Some(parent),
            index,
        }
    }
}

/// What kind of list a drop would land in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentKind<'a> {
    /// The page's top-level list.
    Root,
    /// Inside a component of this type.
    Component(&'a str),
    /// A parent id was given but is not in the tree.
    Unknown,
}

// ─── Lookups ─────────────────────────────────────────────────────────────

/// Depth-first search for `id`.
pub fn find_by_id(tree: &[Component], id: NodeId) -> Option<&Component> {
    for node in tree {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_by_id(node.children(), id) {
            return Some(found);
        }
    }
    None
}

/// Parent id and index of `id`.
pub fn locate(tree: &[Component], id: NodeId) -> Option<Location> {
    locate_in(tree, id, None)
}

fn locate_in(list: &[Component], id: NodeId, parent: Option<NodeId>) -> Option<Location> {
    for (index, node) in list.iter().enumerate() {
        if node.id == id {
            return Some(Location { parent, index });
        }
        if let Some(found) = locate_in(node.children(), id, Some(node.id)) {
            return Some(found);
        }
    }
    None
}

/// Id of the direct parent of `id`. `None` when `id` is a root-level node
/// or is not in the tree at all; use `locate` to tell the two apart.
pub fn find_parent_id(tree: &[Component], id: NodeId) -> Option<NodeId> {
    locate(tree, id).and_then(|loc| loc.parent)
}

/// Type of the node with `id`, or `None` when `id` is absent or unknown.
pub fn get_type_of_id(tree: &[Component], id: Option<NodeId>) -> Option<&str> {
    id.and_then(|id| find_by_id(tree, id))
        .map(|node| node.kind.as_str())
}

/// Kind of list identified by `parent_id` (`None` = root).
pub fn resolve_parent_kind(tree: &[Component], parent_id: Option<NodeId>) -> ParentKind<'_> {
    match parent_id {
        None => ParentKind::Root,
        Some(id) => match find_by_id(tree, id) {
            Some(node) => ParentKind::Component(node.kind.as_str()),
            None => ParentKind::Unknown,
        },
    }
}

/// Child list addressed by `parent` (`None` = the root list). Leaves and
/// unknown parents yield an empty slice.
pub fn children_of(tree: &[Component], parent: Option<NodeId>) -> &[Component] {
    match parent {
        None => tree,
        Some(id) => find_by_id(tree, id).map(Component::children).unwrap_or(&[]),
    }
}

/// All nodes in document (pre-)order.
pub fn preorder(tree: &[Component]) -> Vec<&Component> {
    let mut out = Vec::new();
    collect_preorder(tree, &mut out);
    out
}

fn collect_preorder<'a>(list: &'a [Component], out: &mut Vec<&'a Component>) {
    for node in list {
        out.push(node);
        collect_preorder(node.children(), out);
    }
}

/// All ids in document order.
pub fn collect_ids(tree: &[Component]) -> Vec<NodeId> {
    preorder(tree).into_iter().map(|node| node.id).collect()
}

/// Whether `id` is `node` itself or one of its descendants.
pub fn subtree_contains(node: &Component, id: NodeId) -> bool {
    node.id == id || find_by_id(node.children(), id).is_some()
}

// ─── Loading ─────────────────────────────────────────────────────────────

/// Check that no two nodes share an id.
///
/// # Errors
/// Returns the first repeated id found in document order.
pub fn validate_tree(tree: &[Component]) -> Result<(), TreeError> {
    let mut seen = HashSet::new();
    for node in preorder(tree) {
        if !seen.insert(node.id) {
            return Err(TreeError::DuplicateId(node.id));
        }
    }
    Ok(())
}

/// Parse a persisted tree, normalize it, and validate ids.
///
/// `Section` and `MultiColumn` nodes saved without a child list get an
/// empty one so they stay droppable.
///
/// # Errors
/// Malformed JSON or duplicate ids.
pub fn load_tree(json: &str) -> Result<Vec<Component>, TreeError> {
    let mut tree: Vec<Component> = serde_json::from_str(json)?;
    for node in &mut tree {
        if (node.kind == kinds::SECTION || node.kind == kinds::MULTI_COLUMN)
            && node.children.is_none()
        {
            node.children = Some(Vec::new());
        }
    }
    validate_tree(&tree)?;
    log::debug!("LOAD tree with {} root components", tree.len());
    Ok(tree)
}

// ─── Tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Vec<Component> {
        vec![
            Component::new("hero", "Image"),
            Component::container(
                "body",
                "Section",
                vec![
                    Component::new("title", "Text"),
                    Component::container(
                        "cols",
                        "MultiColumn",
                        vec![Component::new("left", "Text"), Component::new("right", "Text")],
                    ),
                ],
            ),
        ]
    }

    #[test]
    fn find_by_id_descends() {
        let tree = sample();
        assert_eq!(find_by_id(&tree, NodeId::intern("right")).unwrap().kind, "Text");
        assert!(find_by_id(&tree, NodeId::intern("missing")).is_none());
    }

    #[test]
    fn parent_lookup() {
        let tree = sample();
        assert_eq!(find_parent_id(&tree, NodeId::intern("left")), Some(NodeId::intern("cols")));
        assert_eq!(find_parent_id(&tree, NodeId::intern("hero")), None);
        assert_eq!(
            locate(&tree, NodeId::intern("cols")),
            Some(Location::child_of(NodeId::intern("body"), 1))
        );
        assert_eq!(locate(&tree, NodeId::intern("hero")), Some(Location::root(0)));
        assert_eq!(locate(&tree, NodeId::intern("nope")), None);
    }

    #[test]
    fn type_and_parent_kind() {
        let tree = sample();
        assert_eq!(get_type_of_id(&tree, Some(NodeId::intern("cols"))), Some("MultiColumn"));
        assert_eq!(get_type_of_id(&tree, None), None);
        assert_eq!(get_type_of_id(&tree, Some(NodeId::intern("ghost"))), None);
        assert_eq!(resolve_parent_kind(&tree, None), ParentKind::Root);
        assert_eq!(
            resolve_parent_kind(&tree, Some(NodeId::intern("body"))),
            ParentKind::Component("Section")
        );
        assert_eq!(
            resolve_parent_kind(&tree, Some(NodeId::intern("ghost"))),
            ParentKind::Unknown
        );
    }

    #[test]
    fn children_of_lists() {
        let tree = sample();
        assert_eq!(children_of(&tree, None).len(), 2);
        assert_eq!(children_of(&tree, Some(NodeId::intern("cols"))).len(), 2);
        assert!(children_of(&tree, Some(NodeId::intern("title"))).is_empty());
        assert!(children_of(&tree, Some(NodeId::intern("ghost"))).is_empty());
    }

    #[test]
    fn preorder_ids() {
        let ids: Vec<&str> = collect_ids(&sample()).iter().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["hero", "body", "title", "cols", "left", "right"]);
    }

    #[test]
    fn duplicate_ids_rejected() {
        let tree = vec![
            Component::new("dup", "Text"),
            Component::container("wrap", "Section", vec![Component::new("dup", "Text")]),
        ];
        assert!(matches!(validate_tree(&tree), Err(TreeError::DuplicateId(id)) if id.as_str() == "dup"));
    }

    #[test]
    fn load_tree_normalizes_containers() {
        let tree = load_tree(r#"[{"id":"s","type":"Section"},{"id":"t","type":"Text"}]"#).unwrap();
        assert_eq!(tree[0].children, Some(Vec::new()));
        assert_eq!(tree[1].children, None);
    }

    #[test]
    fn load_tree_reports_bad_json() {
        assert!(matches!(load_tree("{not json"), Err(TreeError::Json(_))));
    }
}
