use std::result::Result as StdResult;

use thiserror::Error;

use crate::id::NodeId;

/// Result type for trellis operations.
pub type Result<T> = StdResult<T, Error>;

/// Core error type.
#[derive(PartialEq, Eq, Error, Debug, Clone)]
pub enum Error {
    #[error("focus: {0}")]
    /// Focus-related failure.
    Focus(String),
    #[error("tree: {0}")]
    /// Tree-structure violation.
    Tree(String),
    #[error("geometry: {0}")]
    /// Geometry failure.
    Geometry(String),
    #[error("node not found: {0:?}")]
    /// Operation on a node id that is no longer in the tree.
    NodeNotFound(NodeId),

    #[error("invalid: {0}")]
    /// Malformed input, such as an invalid node name.
    Invalid(String),
}
