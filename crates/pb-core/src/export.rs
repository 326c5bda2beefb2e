//! Runtime export: stamp editor metadata onto a copy of the tree.
//!
//! The exported tree is the only thing the renderer sees, so everything it
//! needs from the editor (per-breakpoint hiding, custom-device hiding,
//! mobile stacking and order) is written onto the nodes as plain props.
//! Linked globals are resolved first so overrides land on the resolved node.

use crate::model::{Breakpoint, Component, EditorFlags, EditorMap, Globals, props};
use serde_json::Value;

/// Export `tree` for rendering.
///
/// Every node gets `hiddenBreakpoints` and `hiddenDeviceIds` (possibly
/// empty); `stackStrategy` and `orderMobile` are written only when the
/// editor set them. Values already on a node are kept and merged. The input
/// is not modified and all other fields are copied verbatim.
pub fn export_components(tree: &[Component], editor: &EditorMap, globals: Option<&Globals>) -> Vec<Component> {
    let mut resolving = Vec::new();
    export_list(tree, editor, globals, &mut resolving)
}

fn export_list(
    list: &[Component],
    editor: &EditorMap,
    globals: Option<&Globals>,
    resolving: &mut Vec<String>,
) -> Vec<Component> {
    list.iter()
        .map(|node| export_node(node, editor, globals, resolving))
        .collect()
}

fn export_node(
    node: &Component,
    editor: &EditorMap,
    globals: Option<&Globals>,
    resolving: &mut Vec<String>,
) -> Component {
    let depth = resolving.len();
    let mut out = match globals {
        Some(globals) => resolve_global(node, globals, resolving),
        None => node.clone(),
    };
    log::trace!("EXPORT {} ({})", out.id, out.kind);

    let defaults = EditorFlags::default();
    let flags = editor.get(&node.id).unwrap_or(&defaults);
    stamp(&mut out, flags);

    if let Some(children) = out.children.take() {
        out.children = Some(export_list(&children, editor, globals, resolving));
    }
    resolving.truncate(depth);
    out
}

/// Follow `globalId` links from `node`. The result keeps the instance's id
/// so per-instance editor metadata still applies. A link back into a global
/// that is already being resolved is left unresolved.
fn resolve_global(node: &Component, globals: &Globals, resolving: &mut Vec<String>) -> Component {
    let mut current = node.clone();
    while let Some(key) = current.global_ref().map(str::to_string) {
        if resolving.contains(&key) {
            log::warn!("EXPORT global cycle through {key:?}; leaving {} unresolved", node.id);
            break;
        }
        let Some(definition) = globals.get(&key) else {
            log::warn!("EXPORT unknown global {key:?} on {}", node.id);
            break;
        };
        resolving.push(key);
        current = Component {
            id: node.id,
            ..definition.clone()
        };
    }
    current
}

fn stamp(node: &mut Component, flags: &EditorFlags) {
    let mut breakpoints = string_list(node.prop(props::HIDDEN_BREAKPOINTS));
    for bp in &flags.hidden {
        push_unique(&mut breakpoints, bp.as_str());
    }
    let mut devices = string_list(node.prop(props::HIDDEN_DEVICE_IDS));
    for device in &flags.hidden_device_ids {
        push_unique(&mut devices, device);
    }
    node.props
        .insert(props::HIDDEN_BREAKPOINTS.to_string(), Value::from(breakpoints));
    node.props
        .insert(props::HIDDEN_DEVICE_IDS.to_string(), Value::from(devices));

    if flags.stack_mobile.is_some() || flags.stack_strategy.is_some() {
        let strategy = flags.stack_for(Breakpoint::Mobile);
        node.props
            .insert(props::STACK_STRATEGY.to_string(), Value::from(strategy.as_str()));
    }
    if let Some(order) = flags.order_mobile {
        node.props
            .insert(props::ORDER_MOBILE.to_string(), Value::from(order));
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn push_unique(list: &mut Vec<String>, item: &str) {
    if !list.iter().any(|existing| existing == item) {
        list.push(item.to_string());
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::NodeId;
    use crate::model::StackStrategy;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn empty_metadata_adds_empty_lists() {
        let tree = vec![Component::container(
            "s",
            "Section",
            vec![Component::new("t", "Text").with_prop("text", "hello")],
        )];
        let out = export_components(&tree, &EditorMap::new(), None);
        let v = serde_json::to_value(&out).unwrap();
        assert_eq!(
            v,
            json!([{
                "id": "s",
                "type": "Section",
                "hiddenBreakpoints": [],
                "hiddenDeviceIds": [],
                "children": [{
                    "id": "t",
                    "type": "Text",
                    "text": "hello",
                    "hiddenBreakpoints": [],
                    "hiddenDeviceIds": []
                }]
            }])
        );
    }

    #[test]
    fn flags_are_stamped() {
        let tree = vec![Component::new("t", "Text")];
        let mut flags = EditorFlags::default();
        flags.hide_on(Breakpoint::Mobile);
        flags.hide_on_device("tv");
        flags.stack_strategy = Some(StackStrategy::Reverse);
        flags.order_mobile = Some(3);
        let mut editor = EditorMap::new();
        editor.insert(NodeId::intern("t"), flags);

        let out = export_components(&tree, &editor, None);
        assert_eq!(out[0].prop("hiddenBreakpoints"), Some(&json!(["mobile"])));
        assert_eq!(out[0].prop("hiddenDeviceIds"), Some(&json!(["tv"])));
        assert_eq!(out[0].prop("stackStrategy"), Some(&json!("reverse")));
        assert_eq!(out[0].prop("orderMobile"), Some(&json!(3)));
        // Input untouched.
        assert!(tree[0].props.is_empty());
    }

    #[test]
    fn export_is_idempotent() {
        let tree = vec![Component::new("t", "Text")];
        let mut editor = EditorMap::new();
        let mut flags = EditorFlags::default();
        flags.hide_on(Breakpoint::Tablet);
        editor.insert(NodeId::intern("t"), flags);
        let once = export_components(&tree, &editor, None);
        let twice = export_components(&once, &editor, None);
        assert_eq!(once, twice);
    }

    #[test]
    fn globals_resolve_before_stamping() {
        let tree = vec![Component::new("footer_ref", "GlobalRef").with_prop("globalId", "footer")];
        let mut globals = Globals::new();
        globals.insert(
            "footer".into(),
            Component::container("footer_def", "Section", vec![Component::new("copyright", "Text")]),
        );
        let mut editor = EditorMap::new();
        let mut flags = EditorFlags::default();
        flags.hide_on(Breakpoint::Mobile);
        editor.insert(NodeId::intern("footer_ref"), flags);

        let out = export_components(&tree, &editor, Some(&globals));
        assert_eq!(out[0].id.as_str(), "footer_ref");
        assert_eq!(out[0].kind, "Section");
        assert_eq!(out[0].children()[0].id.as_str(), "copyright");
        assert_eq!(out[0].prop("hiddenBreakpoints"), Some(&json!(["mobile"])));
    }

    #[test]
    fn global_cycles_terminate() {
        let tree = vec![Component::new("r", "GlobalRef").with_prop("globalId", "a")];
        let mut globals = Globals::new();
        globals.insert("a".into(), Component::new("a_def", "GlobalRef").with_prop("globalId", "b"));
        globals.insert(
            "b".into(),
            Component::container(
                "b_def",
                "Section",
                vec![Component::new("inner", "GlobalRef").with_prop("globalId", "a")],
            ),
        );
        let out = export_components(&tree, &EditorMap::new(), Some(&globals));
        assert_eq!(out[0].kind, "Section");
        // The nested link back to "a" is left as a reference.
        assert_eq!(out[0].children()[0].global_ref(), Some("a"));
    }
}
