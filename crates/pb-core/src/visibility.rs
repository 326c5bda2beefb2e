//! Per-viewport visibility and stacking.
//!
//! Visibility is a per-node predicate. Nothing is inherited: a hidden
//! container simply never reaches its children because callers stop at it.

use crate::id::NodeId;
use crate::model::{Breakpoint, Component, EditorMap, StackStrategy, Viewport};

// ─── Visibility ──────────────────────────────────────────────────────────

/// Whether `component` is suppressed at `viewport`.
///
/// Hidden when any of these hold:
/// - the component's own `hidden` prop is `true`;
/// - the viewport's breakpoint is in the component's `hidden` set;
/// - a custom device is active and listed in `hiddenDeviceIds`.
pub fn is_hidden_for_viewport(component: &Component, editor: &EditorMap, viewport: &Viewport) -> bool {
    if component.is_hidden_everywhere() {
        return true;
    }
    let Some(flags) = editor.get(&component.id) else {
        return false;
    };
    if flags.hidden.contains(&viewport.breakpoint) {
        return true;
    }
    match &viewport.device {
        Some(device) => flags.hidden_device_ids.iter().any(|d| d == device),
        None => false,
    }
}

/// Top-level components visible at `viewport`, in document order.
///
/// Children of excluded nodes stay attached to them; they are filtered
/// again wherever they themselves are listed.
pub fn get_visible_components<'a>(
    tree: &'a [Component],
    editor: &EditorMap,
    viewport: &Viewport,
) -> Vec<&'a Component> {
    filter_visible(tree, editor, viewport)
}

/// Visible children of `parent` at `viewport`.
pub fn visible_children<'a>(
    parent: &'a Component,
    editor: &EditorMap,
    viewport: &Viewport,
) -> Vec<&'a Component> {
    filter_visible(parent.children(), editor, viewport)
}

fn filter_visible<'a>(
    list: &'a [Component],
    editor: &EditorMap,
    viewport: &Viewport,
) -> Vec<&'a Component> {
    list.iter()
        .filter(|c| !is_hidden_for_viewport(c, editor, viewport))
        .collect()
}

/// Map an index in a visible list back to the full list it was filtered
/// from. Indices past the visible end map to the end of `list`.
pub fn to_underlying_index(list: &[Component], visible: &[&Component], ui_index: usize) -> usize {
    visible
        .get(ui_index)
        .and_then(|target| list.iter().position(|c| c.id == target.id))
        .unwrap_or(list.len())
}

// ─── Stacking ────────────────────────────────────────────────────────────

/// Children of `parent` in the order they stack at `bp`.
///
/// - `default`: document order.
/// - `reverse`: document order reversed.
/// - `custom`: ascending per-breakpoint order key; a child without a key
///   uses its document index. Ties keep document order.
pub fn ordered_children<'a>(
    parent: &'a Component,
    editor: &EditorMap,
    bp: Breakpoint,
) -> Vec<&'a Component> {
    let strategy = editor
        .get(&parent.id)
        .map(|flags| flags.stack_for(bp))
        .unwrap_or_default();
    let mut children: Vec<&Component> = parent.children().iter().collect();
    match strategy {
        StackStrategy::Default => {}
        StackStrategy::Reverse => children.reverse(),
        StackStrategy::Custom => {
            let mut keyed: Vec<(u32, &Component)> = children
                .iter()
                .enumerate()
                .map(|(index, child)| {
                    let key = editor
                        .get(&child.id)
                        .and_then(|flags| flags.order_for(bp))
                        .unwrap_or(index as u32);
                    (key, *child)
                })
                .collect();
            keyed.sort_by_key(|(key, _)| *key);
            children = keyed.into_iter().map(|(_, child)| child).collect();
        }
    }
    children
}

// ─── Locking ─────────────────────────────────────────────────────────────

/// `selection` without components flagged as locked.
pub fn unlocked_ids(selection: &[NodeId], editor: &EditorMap) -> Vec<NodeId> {
    selection
        .iter()
        .copied()
        .filter(|id| !editor.get(id).is_some_and(|flags| flags.is_locked()))
        .collect()
}

// ─── Tests ───────────────────────────────────────────────────────────────
