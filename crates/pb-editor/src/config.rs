//! Editor configuration.
//!
//! Policy knobs the host can tune per editing session. Every field has a
//! default, so `{}` is a valid configuration.

use crate::error::EditError;
use crate::history::DEFAULT_HISTORY_LIMIT;
use pb_core::model::kinds;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Undo depth. `0` keeps every past tree.
    pub history_limit: usize,

    /// Fewest siblings a group request may wrap. Default: **2**.
    pub min_group_size: usize,

    /// Snapping unit for pointer x while dragging, in canvas units.
    pub grid_size: f64,

    /// Component types that accept children.
    pub container_types: Vec<String>,

    /// Distance from a scroll container's edge where autoscroll starts.
    pub autoscroll_edge: f64,

    /// Scroll step at the very edge.
    pub autoscroll_max_speed: f64,

    /// Initial props for new palette components, keyed by type.
    pub component_defaults: HashMap<String, Map<String, Value>>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            min_group_size: pb_core::DEFAULT_MIN_GROUP_SIZE,
            grid_size: 1.0,
            container_types: [
                kinds::SECTION,
                kinds::MULTI_COLUMN,
                kinds::CONTAINER,
                kinds::TABS,
                kinds::GRID,
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
            autoscroll_edge: 48.0,
            autoscroll_max_speed: 28.0,
            component_defaults: HashMap::new(),
        }
    }
}

impl EditorConfig {
    /// Parse and validate a JSON configuration.
    ///
    /// # Errors
    /// Malformed JSON, or values no session could run with.
    pub fn from_json(json: &str) -> Result<Self, EditError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// `InvalidConfig` naming the first offending field.
    pub fn validate(&self) -> Result<(), EditError> {
        if self.min_group_size == 0 {
            return Err(EditError::InvalidConfig("minGroupSize must be at least 1".into()));
        }
        if !(self.grid_size > 0.0) {
            return Err(EditError::InvalidConfig("gridSize must be positive".into()));
        }
        if self.autoscroll_edge < 0.0 || self.autoscroll_max_speed < 0.0 {
            return Err(EditError::InvalidConfig("autoscroll values must not be negative".into()));
        }
        Ok(())
    }

    pub fn is_container_type(&self, kind: &str) -> bool {
        self.container_types.iter().any(|t| t == kind)
    }
}
