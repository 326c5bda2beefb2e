//! Core data model for page-builder documents.
//!
//! A page is an ordered forest of `Component` nodes. Containers hold their
//! children inline, so a tree snapshot is a plain `Vec<Component>` that can
//! be cloned into history and compared structurally. Editor-only state
//! (per-breakpoint visibility, stacking, mobile order) lives beside the tree
//! in an `EditorMap` keyed by component id.

use crate::id::NodeId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;

// ─── Component kinds ─────────────────────────────────────────────────────

/// Component type names the engine reads. Every other type is opaque.
pub mod kinds {
    pub const SECTION: &str = "Section";
    pub const MULTI_COLUMN: &str = "MultiColumn";
    pub const CONTAINER: &str = "Container";
    pub const TABS: &str = "Tabs";
    pub const GRID: &str = "Grid";
    pub const TEXT: &str = "Text";
    pub const IMAGE: &str = "Image";
}

/// Prop keys with engine-level meaning.
pub mod props {
    /// Column count on `MultiColumn` containers.
    pub const COLUMNS: &str = "columns";
    /// Component-level "never render" switch.
    pub const HIDDEN: &str = "hidden";
    /// Key into the globals map for linked global references.
    pub const GLOBAL_ID: &str = "globalId";
    pub const HIDDEN_BREAKPOINTS: &str = "hiddenBreakpoints";
    pub const HIDDEN_DEVICE_IDS: &str = "hiddenDeviceIds";
    pub const STACK_STRATEGY: &str = "stackStrategy";
    pub const ORDER_MOBILE: &str = "orderMobile";
}

// ─── Component ───────────────────────────────────────────────────────────

/// A node in the page composition tree.
///
/// Serialized as `{ "id", "type", "children"?, ...props }`. Props the engine
/// does not understand pass through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: NodeId,

    /// Component kind, e.g. `Section`, `Text`, `MultiColumn`.
    #[serde(rename = "type")]
    pub kind: String,

    /// Ordered children. `None` for leaves; order is render order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Component>>,

    /// Type-specific props (label, href, src, variant, ...).
    #[serde(flatten)]
    pub props: Map<String, Value>,
}

impl Component {
    /// A leaf component with no props.
    pub fn new(id: impl Into<NodeId>, kind: &str) -> Self {
        Self {
            id: id.into(),
            kind: kind.to_string(),
            children: None,
            props: Map::new(),
        }
    }

    /// A container holding `children`.
    pub fn container(id: impl Into<NodeId>, kind: &str, children: Vec<Component>) -> Self {
        Self {
            children: Some(children),
            ..Self::new(id, kind)
        }
    }

    /// Builder-style prop setter.
    #[must_use]
    pub fn with_prop(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.props.insert(key.to_string(), value.into());
        self
    }

    /// Children as a slice; empty for leaves.
    pub fn children(&self) -> &[Component] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Whether this node carries a child list (possibly empty).
    pub fn has_children(&self) -> bool {
        self.children.is_some()
    }

    pub fn prop(&self, key: &str) -> Option<&Value> {
        self.props.get(key)
    }

    /// Column count for `MultiColumn` containers.
    pub fn columns(&self) -> Option<u64> {
        self.prop(props::COLUMNS).and_then(Value::as_u64)
    }

    /// The `globalId` this node links to, if it is a global reference.
    pub fn global_ref(&self) -> Option<&str> {
        self.prop(props::GLOBAL_ID).and_then(Value::as_str)
    }

    /// The component-level `hidden: true` switch.
    pub fn is_hidden_everywhere(&self) -> bool {
        self.prop(props::HIDDEN).and_then(Value::as_bool) == Some(true)
    }
}

/// Shared component definitions referenced by `globalId`.
pub type Globals = HashMap<String, Component>;

// ─── Breakpoints & viewports ─────────────────────────────────────────────

/// Standard responsive breakpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    Desktop,
    Tablet,
    Mobile,
}

impl Breakpoint {
    pub const ALL: [Breakpoint; 3] = [Breakpoint::Desktop, Breakpoint::Tablet, Breakpoint::Mobile];

    pub fn as_str(self) -> &'static str {
        match self {
            Breakpoint::Desktop => "desktop",
            Breakpoint::Tablet => "tablet",
            Breakpoint::Mobile => "mobile",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "desktop" => Some(Breakpoint::Desktop),
            "tablet" => Some(Breakpoint::Tablet),
            "mobile" => Some(Breakpoint::Mobile),
            _ => None,
        }
    }
}

impl fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The viewport the canvas is currently previewing.
///
/// A custom device still belongs to a breakpoint category, so breakpoint
/// rules keep applying while it is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewport {
    pub breakpoint: Breakpoint,
    /// Active custom device id, if any.
    pub device: Option<String>,
}

impl Viewport {
    pub fn device(id: &str, breakpoint: Breakpoint) -> Self {
        Self {
            breakpoint,
            device: Some(id.to_string()),
        }
    }
}

impl From<Breakpoint> for Viewport {
    fn from(breakpoint: Breakpoint) -> Self {
        Self {
            breakpoint,
            device: None,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Breakpoint::Desktop.into()
    }
}

// ─── Editor metadata ─────────────────────────────────────────────────────

/// How a container orders its children once collapsed to a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackStrategy {
    #[default]
    Default,
    Reverse,
    /// Children sort by their per-breakpoint order key.
    Custom,
}

impl StackStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            StackStrategy::Default => "default",
            StackStrategy::Reverse => "reverse",
            StackStrategy::Custom => "custom",
        }
    }
}

/// Editor-only flags for one component. Never part of the persisted node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorFlags {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i64>,

    /// Breakpoints this component is suppressed on.
    #[serde(skip_serializing_if = "SmallVec::is_empty")]
    pub hidden: SmallVec<[Breakpoint; 3]>,
    /// Custom devices this component is suppressed on.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hidden_device_ids: Vec<String>,

    /// Legacy single (mobile) stacking strategy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_strategy: Option<StackStrategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_desktop: Option<StackStrategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_tablet: Option<StackStrategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_mobile: Option<StackStrategy>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_desktop: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_tablet: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_mobile: Option<u32>,
}

impl EditorFlags {
    /// Add `bp` to the hidden set (no duplicates).
    pub fn hide_on(&mut self, bp: Breakpoint) {
        if !self.hidden.contains(&bp) {
            self.hidden.push(bp);
        }
    }

    pub fn show_on(&mut self, bp: Breakpoint) {
        self.hidden.retain(|b| *b != bp);
    }

    /// Add a custom device to the hidden set (no duplicates).
    pub fn hide_on_device(&mut self, device: &str) {
        if !self.hidden_device_ids.iter().any(|d| d == device) {
            self.hidden_device_ids.push(device.to_string());
        }
    }

    pub fn show_on_device(&mut self, device: &str) {
        self.hidden_device_ids.retain(|d| d != device);
    }

    pub fn is_locked(&self) -> bool {
        self.locked == Some(true)
    }

    /// Effective stacking strategy for `bp`. The legacy `stackStrategy`
    /// field only stands in for mobile.
    pub fn stack_for(&self, bp: Breakpoint) -> StackStrategy {
        let explicit = match bp {
            Breakpoint::Desktop => self.stack_desktop,
            Breakpoint::Tablet => self.stack_tablet,
            Breakpoint::Mobile => self.stack_mobile.or(self.stack_strategy),
        };
        explicit.unwrap_or_default()
    }

    /// Explicit order key on `bp`, if set.
    pub fn order_for(&self, bp: Breakpoint) -> Option<u32> {
        match bp {
            Breakpoint::Desktop => self.order_desktop,
            Breakpoint::Tablet => self.order_tablet,
            Breakpoint::Mobile => self.order_mobile,
        }
    }
}

/// Editor metadata for a whole page, keyed by component id.
pub type EditorMap = HashMap<NodeId, EditorFlags>;

// ─── Tests ───────────────────────────────────────────────────────────────
