//! Error types for the editing session.

use pb_core::{GroupError, NodeId, TreeError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditError {
    #[error(transparent)]
    Group(#[from] GroupError),

    #[error("unknown component id: {0}")]
    UnknownId(NodeId),

    #[error("{child} cannot be placed in {parent}")]
    PlacementRejected { parent: String, child: String },

    #[error("invalid editor config: {0}")]
    InvalidConfig(String),

    #[error("tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}
