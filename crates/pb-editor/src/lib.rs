//! Stateful editing on top of `pb-core`: history, sessions, placement
//! rules and drag-and-drop resolution.

pub mod cache;
pub mod config;
pub mod drop;
pub mod error;
pub mod history;
pub mod rules;
pub mod session;

pub use cache::InstanceCache;
pub use config::EditorConfig;
pub use drop::{
    DragSource, DropHighlighter, DropOver, DropRect, Insertion, LayoutTree, autoscroll_velocity, drop_allowed,
    plan_drop, resolve_drop_rect, resolve_insertion, screen_to_canvas, snap_to_grid,
};
pub use error::EditError;
pub use history::{DEFAULT_HISTORY_LIMIT, HistoryPhase, HistoryState, export_components_from_history};
pub use rules::can_drop_child;
pub use session::{Applied, EditAction, EditorSession};
