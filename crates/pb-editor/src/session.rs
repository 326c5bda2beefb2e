//! The editing session: one operator, one tree, full history.
//!
//! `EditorSession` is the single writer over a page. Every tree edit runs
//! through [`EditorSession::apply`], which computes the next tree with the
//! pure functions in `pb_core` and commits it to history only when it
//! differs from the present.

use crate::cache::InstanceCache;
use crate::config::EditorConfig;
use crate::error::EditError;
use crate::history::{HistoryState, export_components_from_history};
use crate::rules::can_drop_child;
use pb_core::id::NodeId;
use pb_core::model::{Component, EditorFlags, EditorMap, Globals};
use pb_core::tree::{Location, ParentKind, find_by_id, resolve_parent_kind, validate_tree};
use pb_core::{
    compute_diff_summary, duplicate_component, get_type_of_id, group_in_tree, insert_component, locate,
    move_component, remove_component, revert_component, ungroup_container, unlocked_ids, update_component,
};
use serde_json::{Map, Value};

/// One operator edit.
#[derive(Debug, Clone, PartialEq)]
pub enum EditAction {
    /// Insert a new component (`parent: None` = root).
    Add {
        component: Component,
        parent: Option<NodeId>,
        index: usize,
    },
    /// Move a component; `to.index` counts after it has been taken out.
    Move { id: NodeId, to: Location },
    Remove { id: NodeId },
    /// Copy a component (fresh ids) right after the original.
    Duplicate { id: NodeId },
    /// Shallow prop patch; `null` removes a prop.
    Update { id: NodeId, patch: Map<String, Value> },
    /// Wrap sibling components in a new container of `container_type`.
    Group { ids: Vec<NodeId>, container_type: String },
    Ungroup { id: NodeId },
    /// Restore one component to its state in `saved`.
    Revert { id: NodeId, saved: Vec<Component> },
    /// Replace the editor-only flags of a component. Not an undo step.
    SetEditorFlags { id: NodeId, flags: EditorFlags },
}

/// What an applied action did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Nothing changed; history untouched.
    Noop,
    /// A new present was committed.
    Committed,
    /// A new present was committed and it holds a new component.
    Created(NodeId),
    /// Editor metadata changed; history untouched.
    MetadataChanged,
}

pub struct EditorSession<V = ()> {
    history: HistoryState,
    config: EditorConfig,
    cache: InstanceCache<V>,
}

impl<V> EditorSession<V> {
    /// Open a session over a loaded tree and its editor metadata.
    ///
    /// # Errors
    /// An invalid `config`, or a tree with duplicate ids.
    pub fn new(tree: Vec<Component>, editor: EditorMap, config: EditorConfig) -> Result<Self, EditError> {
        config.validate()?;
        validate_tree(&tree)?;
        log::debug!("SESSION open ({} root components)", tree.len());
        Ok(Self {
            history: HistoryState::with_limit(tree, config.history_limit).with_editor(editor),
            config,
            cache: InstanceCache::new(),
        })
    }

    pub fn present(&self) -> &[Component] {
        &self.history.present
    }

    pub fn editor(&self) -> &EditorMap {
        &self.history.editor
    }

    pub fn history(&self) -> &HistoryState {
        &self.history
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn cache_mut(&mut self) -> &mut InstanceCache<V> {
        &mut self.cache
    }

    // ─── Edits ───────────────────────────────────────────────────────────

    /// Apply one edit.
    ///
    /// Stale ids resolve to [`Applied::Noop`]. Requests that would break a
    /// placement rule or a grouping precondition are refused with an error
    /// and change nothing.
    ///
    /// # Errors
    /// `PlacementRejected` when `Add`, `Move`, `Group` or `Ungroup` would put a
    /// component where the placement rules forbid it;
    /// `SelectionTooSmall`/`NotSiblings` for `Group`; `Tree(DuplicateId)` when a
    /// `Revert` would restore an id that now lives elsewhere in the tree.
    pub fn apply(&mut self, action: EditAction) -> Result<Applied, EditError> {
        let present = &self.history.present;
        let (next, created) = match action {
            EditAction::Add {
                component,
                parent,
                index,
            } => {
                self.check_placement(parent, &component.kind)?;
                let id = component.id;
                (insert_component(present, parent, index, component), Some(id))
            }
            EditAction::Move { id, to } => {
                if let Some(kind) = get_type_of_id(present, Some(id)) {
                    self.check_placement(to.parent, kind)?;
                }
                (move_component(present, id, to), None)
            }
            EditAction::Remove { id } => (remove_component(present, id), None),
            EditAction::Duplicate { id } => duplicate_component(present, id),
            EditAction::Update { id, patch } => (update_component(present, id, &patch), None),
            EditAction::Group { ids, container_type } => {
                let ids = unlocked_ids(&ids, &self.history.editor);
                let Some(members) = ids.iter().map(|id| find_by_id(present, *id)).collect::<Option<Vec<_>>>() else {
                    log::warn!("GROUP skipped: selection names an unknown component");
                    return Ok(Applied::Noop);
                };
                if let Some(first) = ids.first()
                    && let Some(loc) = locate(present, *first)
                {
                    self.check_placement(loc.parent, &container_type)?;
                }
                for member in &members {
                    self.check_drop(ParentKind::Component(container_type.as_str()), &container_type, &member.kind)?;
                }
                let container_id = NodeId::with_prefix(&container_type.to_ascii_lowercase());
                let next = group_in_tree(
                    present,
                    &ids,
                    &container_type,
                    container_id,
                    self.config.min_group_size,
                )?;
                (next, Some(container_id))
            }
            EditAction::Ungroup { id } => {
                // Released children land in the container's own parent.
                if let Some(loc) = locate(present, id)
                    && let Some(container) = find_by_id(present, id)
                {
                    for child in container.children() {
                        self.check_placement(loc.parent, &child.kind)?;
                    }
                }
                (ungroup_container(present, id), None)
            }
            EditAction::Revert { id, saved } => {
                let reverted = compute_diff_summary(present, Some(saved.as_slice()))
                    .map(|summary| revert_component(present, &summary, id))
                    .unwrap_or_else(|| present.clone());
                // The saved subtree may name ids that have since moved elsewhere.
                if let Err(err) = validate_tree(&reverted) {
                    log::warn!("REVERT refused for {id}: {err}");
                    return Err(err.into());
                }
                (reverted, None)
            }
            EditAction::SetEditorFlags { id, flags } => {
                return Ok(self.set_editor_flags(id, flags));
            }
        };

        if next == self.history.present {
            log::debug!("SESSION edit left the tree unchanged");
            return Ok(Applied::Noop);
        }
        self.history.commit(next);
        // Insertions that collided with an existing id were refused above.
        Ok(match created {
            Some(id) if find_by_id(&self.history.present, id).is_some() => Applied::Created(id),
            _ => Applied::Committed,
        })
    }

    /// Apply a batch in order, stopping at the first refused action.
    ///
    /// # Errors
    /// The first refusal. Earlier actions stay applied.
    pub fn apply_all(&mut self, actions: impl IntoIterator<Item = EditAction>) -> Result<Vec<Applied>, EditError> {
        actions.into_iter().map(|action| self.apply(action)).collect()
    }

    fn check_placement(&self, parent: Option<NodeId>, kind: &str) -> Result<(), EditError> {
        let label = parent.map_or_else(|| "the page root".to_string(), |id| id.to_string());
        self.check_drop(resolve_parent_kind(&self.history.present, parent), &label, kind)
    }

    fn check_drop(&self, parent: ParentKind<'_>, label: &str, kind: &str) -> Result<(), EditError> {
        if can_drop_child(parent, kind, &self.config) {
            return Ok(());
        }
        log::warn!("SESSION placement refused: {kind} into {label}");
        Err(EditError::PlacementRejected {
            parent: label.to_string(),
            child: kind.to_string(),
        })
    }

    fn set_editor_flags(&mut self, id: NodeId, flags: EditorFlags) -> Applied {
        if locate(&self.history.present, id).is_none() {
            log::warn!("FLAGS skipped: {id} not found");
            return Applied::Noop;
        }
        let current = self.history.editor.get(&id).cloned().unwrap_or_default();
        if current == flags {
            return Applied::Noop;
        }
        log::debug!("FLAGS {id} updated");
        if flags == EditorFlags::default() {
            self.history.editor.remove(&id);
        } else {
            self.history.editor.insert(id, flags);
        }
        Applied::MetadataChanged
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        self.history.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ─── Output ──────────────────────────────────────────────────────────

    /// Runtime tree for the current present.
    pub fn export(&self, globals: Option<&Globals>) -> Vec<Component> {
        export_components_from_history(Some(&self.history), globals)
    }

    /// Close the session, handing back the final tree and metadata for
    /// persistence. Cached instances are dropped.
    pub fn end(mut self) -> (Vec<Component>, EditorMap) {
        self.cache.clear();
        log::debug!("SESSION end ({} undo steps discarded)", self.history.past.len());
        (self.history.present, self.history.editor)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────
