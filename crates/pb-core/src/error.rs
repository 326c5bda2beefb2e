//! Error types for loading and regrouping component trees.
//!
//! Queries and edits never fail on unknown ids. Only malformed input from a
//! persistence collaborator and refused grouping requests are reported.

use crate::id::NodeId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("duplicate component id: {0}")]
    DuplicateId(NodeId),

    #[error("malformed component JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a grouping request was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GroupError {
    #[error("grouping needs at least {min} components, got {got}")]
    SelectionTooSmall { got: usize, min: usize },

    #[error("component {0} is not a sibling of the rest of the selection")]
    NotSiblings(NodeId),
}
