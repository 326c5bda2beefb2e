pub mod diff;
pub mod edit;
pub mod error;
pub mod export;
pub mod id;
pub mod model;
pub mod tree;
pub mod visibility;

pub use diff::{DiffSummary, ModifiedEntry, compute_diff_summary, replace_component_by_id, revert_component};
pub use edit::{
    DEFAULT_MIN_GROUP_SIZE, clone_with_fresh_ids, duplicate_component, group_in_tree, group_into_container,
    insert_component, move_component, remove_component, try_group_into_container, ungroup_container,
    update_component,
};
pub use error::{GroupError, TreeError};
pub use export::export_components;
pub use id::NodeId;
pub use model::*;
pub use tree::{
    Location, ParentKind, children_of, collect_ids, find_by_id, find_parent_id, get_type_of_id, load_tree, locate,
    preorder, resolve_parent_kind, subtree_contains, validate_tree,
};
pub use visibility::{
    get_visible_components, is_hidden_for_viewport, ordered_children, to_underlying_index, unlocked_ids,
    visible_children,
};
