//! Linear undo/redo history over component trees.
//!
//! `past` and `future` hold whole tree snapshots. Snapshots are never
//! edited after they are pushed, because every structural edit produces a
//! fresh tree, so undo and redo are plain moves between the two deques.
//!
//! Editor metadata sits next to the stacks, not inside them: hiding a
//! component is not an undo step, and undoing a removal brings the node
//! back with whatever flags its id still has.

use pb_core::model::{Component, EditorMap, Globals};
use pb_core::export_components;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default undo depth.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Where the history currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryPhase {
    /// Nothing to undo or redo.
    Clean,
    /// At least one edit can be undone; nothing to redo.
    DirtyUndoable,
    /// At least one undone edit can be redone.
    Redoable,
}

/// `{past, present, future}` plus the unversioned editor metadata map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryState {
    /// Older trees, most recent last.
    pub past: VecDeque<Vec<Component>>,
    pub present: Vec<Component>,
    /// Undone trees, next redo first.
    pub future: VecDeque<Vec<Component>>,
    #[serde(default)]
    pub editor: EditorMap,
    /// Cap on `past`; `0` means unbounded.
    #[serde(skip, default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

impl HistoryState {
    pub fn new(present: Vec<Component>) -> Self {
        Self::with_limit(present, DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_limit(present: Vec<Component>, limit: usize) -> Self {
        Self {
            past: VecDeque::new(),
            present,
            future: VecDeque::new(),
            editor: EditorMap::new(),
            limit,
        }
    }

    #[must_use]
    pub fn with_editor(mut self, editor: EditorMap) -> Self {
        self.editor = editor;
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Change the cap, dropping the oldest entries if `past` is over it.
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
        self.trim_past();
    }

    /// Make `next` the present. The old present goes onto `past` and any
    /// redo branch is discarded.
    pub fn commit(&mut self, next: Vec<Component>) {
        let previous = std::mem::replace(&mut self.present, next);
        self.past.push_back(previous);
        self.trim_past();
        if !self.future.is_empty() {
            log::debug!("HISTORY discarding {} redo entries", self.future.len());
            self.future.clear();
        }
        log::trace!("HISTORY commit (past={})", self.past.len());
    }

    /// Step back one edit. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.past.pop_back() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, previous);
        self.future.push_front(current);
        log::debug!("UNDO (past={}, future={})", self.past.len(), self.future.len());
        true
    }

    /// Re-apply the most recently undone edit. Returns `false` when there
    /// is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.future.pop_front() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, next);
        self.past.push_back(current);
        self.trim_past();
        log::debug!("REDO (past={}, future={})", self.past.len(), self.future.len());
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn phase(&self) -> HistoryPhase {
        if self.can_redo() {
            HistoryPhase::Redoable
        } else if self.can_undo() {
            HistoryPhase::DirtyUndoable
        } else {
            HistoryPhase::Clean
        }
    }

    fn trim_past(&mut self) {
        if self.limit == 0 {
            return;
        }
        while self.past.len() > self.limit {
            self.past.pop_front();
        }
    }
}

/// Export the present tree of `history` with its editor metadata. An
/// absent history exports as an empty page.
pub fn export_components_from_history(history: Option<&HistoryState>, globals: Option<&Globals>) -> Vec<Component> {
    match history {
        Some(history) => export_components(&history.present, &history.editor, globals),
        None => Vec::new(),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────
