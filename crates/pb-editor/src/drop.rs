//! Drop target resolution for canvas drags.
//!
//! Two halves: geometry (pointer → highlight rectangle, grid snapping,
//! autoscroll) and tree position (pointer over X → parent + index, plus
//! the edit a finished drag turns into). Layout is read through the
//! [`LayoutTree`] trait so the arithmetic runs without a real layout engine.
//!
//! ## Coordinate spaces
//!
//! | Space  | Origin               | Units            |
//! |--------|----------------------|------------------|
//! | screen | viewport top-left    | device px        |
//! | canvas | canvas root top-left | un-zoomed units  |

use crate::config::EditorConfig;
use crate::error::EditError;
use crate::rules::can_drop_child;
use crate::session::EditAction;
use kurbo::{Point, Rect, Vec2};
use pb_core::id::NodeId;
use pb_core::model::{Component, EditorMap, Viewport};
use pb_core::tree::{Location, children_of, find_by_id, get_type_of_id, locate, resolve_parent_kind};
use pb_core::visibility::{get_visible_components, to_underlying_index};
use pb_core::clone_with_fresh_ids;
use serde::{Deserialize, Serialize};
use std::fmt;

// ─── Layout access ───────────────────────────────────────────────────────

/// Read-only view of the rendered canvas.
pub trait LayoutTree {
    type Node: Copy + PartialEq + fmt::Debug;

    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// Whether `node` carries the list-item marker of a rendered component.
    fn is_list_item(&self, node: Self::Node) -> bool;

    /// Bounding rectangle in screen space, if `node` is laid out.
    fn bounding_rect(&self, node: Self::Node) -> Option<Rect>;
}

// ─── Highlight rectangle ─────────────────────────────────────────────────

/// Highlight rectangle in canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DropRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl DropRect {
    /// Project `item` (screen space) into the canvas whose screen rectangle
    /// is `canvas`. Negative offsets are kept as-is.
    pub fn project(canvas: Rect, item: Rect, zoom: f64) -> Self {
        Self {
            left: (item.x0 - canvas.x0) / zoom,
            top: (item.y0 - canvas.y0) / zoom,
            width: item.width() / zoom,
            height: item.height() / zoom,
        }
    }

    pub fn to_rect(self) -> Rect {
        Rect::new(self.left, self.top, self.left + self.width, self.top + self.height)
    }
}

/// Highlight state for one canvas while a drag is in flight.
#[derive(Debug, Default)]
pub struct DropHighlighter {
    preview: bool,
    rect: Option<DropRect>,
    drag_over: bool,
}

impl DropHighlighter {
    pub fn new(preview: bool) -> Self {
        Self {
            preview,
            ..Self::default()
        }
    }

    /// Enter or leave preview mode. Entering drops any current highlight.
    pub fn set_preview(&mut self, preview: bool) {
        self.preview = preview;
        if preview {
            self.clear();
        }
    }

    /// Handle a drag-over event on `target`.
    ///
    /// Walks up from `target` to the nearest list item below
    /// `canvas_root` and highlights it. Inert in preview mode.
    pub fn drag_over<L: LayoutTree>(
        &mut self,
        layout: &L,
        canvas_root: L::Node,
        target: L::Node,
        zoom: f64,
    ) -> Option<DropRect> {
        self.rect = if self.preview {
            None
        } else {
            resolve_drop_rect(layout, canvas_root, target, zoom)
        };
        self.drag_over = self.rect.is_some();
        self.rect
    }

    /// Drag left the canvas, ended, or was cancelled.
    pub fn clear(&mut self) {
        self.rect = None;
        self.drag_over = false;
    }

    pub fn rect(&self) -> Option<DropRect> {
        self.rect
    }

    /// Whether the drag currently hovers a valid target.
    pub fn is_drag_over(&self) -> bool {
        self.drag_over
    }
}

/// Highlight for the list item enclosing `target`, without any state.
pub fn resolve_drop_rect<L: LayoutTree>(layout: &L, canvas_root: L::Node, target: L::Node, zoom: f64) -> Option<DropRect> {
    if !(zoom > 0.0) {
        log::warn!("DROP ignored: zoom {zoom} is not positive");
        return None;
    }
    let mut node = target;
    while node != canvas_root {
        if layout.is_list_item(node) {
            let canvas = layout.bounding_rect(canvas_root)?;
            let item = layout.bounding_rect(node)?;
            let rect = DropRect::project(canvas, item, zoom);
            log::trace!("DROP highlight {node:?} → {rect:?}");
            return Some(rect);
        }
        node = layout.parent(node)?;
    }
    None
}

// ─── Pointer helpers ─────────────────────────────────────────────────────

/// Screen point → canvas point.
pub fn screen_to_canvas(point: Point, canvas: Rect, zoom: f64) -> Point {
    Point::new((point.x - canvas.x0) / zoom, (point.y - canvas.y0) / zoom)
}

/// Round `x` to the nearest multiple of `grid`. A non-positive grid
/// disables snapping.
pub fn snap_to_grid(x: f64, grid: f64) -> f64 {
    if grid > 0.0 {
        (x / grid).round() * grid
    } else {
        x
    }
}

/// Scroll step for a pointer near the edges of `scroll` (screen space).
///
/// Within `edge` px of a side the step grows linearly to `max_speed`,
/// rounded up. Up/left are negative. Vertical and horizontal are
/// independent; top wins over bottom and left over right.
pub fn autoscroll_velocity(pointer: Point, scroll: Rect, edge: f64, max_speed: f64) -> Vec2 {
    if !(edge > 0.0) {
        return Vec2::ZERO;
    }
    let speed = |dist: f64| {
        let within = (edge - dist.max(0.0)).max(0.0);
        if within > 0.0 {
            (within / edge * max_speed).ceil()
        } else {
            0.0
        }
    };

    let up = speed(pointer.y - scroll.y0);
    let down = speed(scroll.y1 - pointer.y);
    let left = speed(pointer.x - scroll.x0);
    let right = speed(scroll.x1 - pointer.x);

    let dy = if up > 0.0 && pointer.y < scroll.y0 + edge {
        -up
    } else if down > 0.0 && pointer.y > scroll.y1 - edge {
        down
    } else {
        0.0
    };
    let dx = if left > 0.0 && pointer.x < scroll.x0 + edge {
        -left
    } else if right > 0.0 && pointer.x > scroll.x1 - edge {
        right
    } else {
        0.0
    };
    Vec2::new(dx, dy)
}

// ─── Insertion point ─────────────────────────────────────────────────────

/// What the pointer is currently over.
#[derive(Debug, Clone, PartialEq)]
pub enum DropOver {
    /// Empty canvas area.
    Canvas,
    /// Empty area inside a container.
    Container(NodeId),
    /// A rendered component; `rect` is its screen rectangle.
    Item { id: NodeId, rect: Rect },
}

/// Where a drop would land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Insertion {
    pub parent: Option<NodeId>,
    /// Index among the children shown at the current viewport.
    pub visible_index: usize,
    /// Index in the full child list.
    pub index: usize,
}

impl Insertion {
    pub fn location(&self) -> Location {
        Location {
            parent: self.parent,
            index: self.index,
        }
    }
}

/// Insertion point for a pointer at screen height `pointer_y` over `over`.
///
/// On the canvas or a container's empty area the drop appends after the
/// visible children. Over an item it lands before the item, or after it
/// when the pointer is below the item's midpoint. `None` when `over` names
/// an id that is not in the tree.
pub fn resolve_insertion(
    tree: &[Component],
    editor: &EditorMap,
    viewport: &Viewport,
    over: &DropOver,
    pointer_y: f64,
) -> Option<Insertion> {
    let (parent, visible_index) = match over {
        DropOver::Canvas => (None, visible_len(tree, editor, viewport, None)),
        DropOver::Container(id) => {
            find_by_id(tree, *id)?;
            (Some(*id), visible_len(tree, editor, viewport, Some(*id)))
        }
        DropOver::Item { id, rect } => {
            let loc = locate(tree, *id)?;
            let siblings = children_of(tree, loc.parent);
            let visible = get_visible_components(siblings, editor, viewport);
            let Some(position) = visible.iter().position(|c| c.id == *id) else {
                // Hidden items are not drop targets of their own.
                return Some(Insertion {
                    parent: loc.parent,
                    visible_index: visible.len(),
                    index: loc.index,
                });
            };
            let below = pointer_y > rect.y0 + rect.height() / 2.0;
            (loc.parent, position + usize::from(below))
        }
    };

    let siblings = children_of(tree, parent);
    let visible = get_visible_components(siblings, editor, viewport);
    let index = to_underlying_index(siblings, &visible, visible_index);
    log::trace!("DROP insertion {parent:?}[{visible_index}] → [{index}]");
    Some(Insertion {
        parent,
        visible_index,
        index,
    })
}

fn visible_len(tree: &[Component], editor: &EditorMap, viewport: &Viewport, parent: Option<NodeId>) -> usize {
    get_visible_components(children_of(tree, parent), editor, viewport).len()
}

// ─── Drag sources ────────────────────────────────────────────────────────

/// What is being dragged.
#[derive(Debug, Clone, PartialEq)]
pub enum DragSource {
    /// A new component of `kind` from the palette.
    Palette { kind: String },
    /// Saved templates from the component library, inserted in order.
    Library { templates: Vec<Component> },
    /// An existing component on the canvas. `from` is where the drag
    /// started; planning uses the component's current location.
    Canvas { id: NodeId, from: Location },
}

/// Whether `source` may be dropped into `parent`. `None` when there is
/// nothing to judge (empty template list, unknown component).
pub fn drop_allowed(
    tree: &[Component],
    source: &DragSource,
    parent: Option<NodeId>,
    config: &EditorConfig,
) -> Option<bool> {
    let parent_kind = resolve_parent_kind(tree, parent);
    match source {
        DragSource::Palette { kind } => Some(can_drop_child(parent_kind, kind, config)),
        DragSource::Library { templates } if templates.is_empty() => None,
        DragSource::Library { templates } => Some(
            templates
                .iter()
                .all(|t| can_drop_child(parent_kind, &t.kind, config)),
        ),
        DragSource::Canvas { id, .. } => {
            get_type_of_id(tree, Some(*id)).map(|kind| can_drop_child(parent_kind, kind, config))
        }
    }
}

/// Turn a finished drag into the edits that apply it.
///
/// Palette items are built from the configured defaults; library
/// templates are cloned with fresh ids. A canvas move to a later index in
/// the same parent is shifted by one so the node lands where it was shown.
///
/// # Errors
/// `PlacementRejected` when the placement rules refuse any dragged type;
/// `UnknownId` when a canvas drag names a component that no longer exists.
pub fn plan_drop(
    tree: &[Component],
    source: &DragSource,
    target: Location,
    config: &EditorConfig,
) -> Result<Vec<EditAction>, EditError> {
    let parent_kind = resolve_parent_kind(tree, target.parent);
    let check = |kind: &str| {
        if can_drop_child(parent_kind, kind, config) {
            Ok(())
        } else {
            log::warn!("DROP rejected: {kind} into {parent_kind:?}");
            Err(EditError::PlacementRejected {
                parent: parent_label(parent_kind),
                child: kind.to_string(),
            })
        }
    };

    match source {
        DragSource::Palette { kind } => {
            check(kind)?;
            Ok(vec![EditAction::Add {
                component: new_palette_component(kind, config),
                parent: target.parent,
                index: target.index,
            }])
        }
        DragSource::Library { templates } => {
            for template in templates {
                check(&template.kind)?;
            }
            Ok(templates
                .iter()
                .enumerate()
                .map(|(i, template)| EditAction::Add {
                    component: clone_with_fresh_ids(template),
                    parent: target.parent,
                    index: target.index + i,
                })
                .collect())
        }
        DragSource::Canvas { id, .. } => {
            let kind = get_type_of_id(tree, Some(*id)).ok_or(EditError::UnknownId(*id))?;
            check(kind)?;
            // The drag-start location may predate an undo; read the live one.
            let from = locate(tree, *id).ok_or(EditError::UnknownId(*id))?;
            let mut index = target.index;
            if from.parent == target.parent && from.index < target.index {
                index -= 1;
            }
            Ok(vec![EditAction::Move {
                id: *id,
                to: Location {
                    parent: target.parent,
                    index,
                },
            }])
        }
    }
}

fn new_palette_component(kind: &str, config: &EditorConfig) -> Component {
    let mut component = Component::new(NodeId::with_prefix(&kind.to_ascii_lowercase()), kind);
    if let Some(defaults) = config.component_defaults.get(kind) {
        for (key, value) in defaults {
            if !matches!(key.as_str(), "id" | "type" | "children") {
                component.props.insert(key.clone(), value.clone());
            }
        }
    }
    if config.is_container_type(kind) {
        component.children = Some(Vec::new());
    }
    component
}

fn parent_label(kind: pb_core::ParentKind<'_>) -> String {
    match kind {
        pb_core::ParentKind::Root => "the page root".to_string(),
        pb_core::ParentKind::Component(kind) => kind.to_string(),
        pb_core::ParentKind::Unknown => "an unknown parent".to_string(),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────
