//! Error types for the UI tree
//!
//! Everything that can go wrong loading a dump or walking the arena. The
//! driver only ever sees these folded into a `CollaboratorError`.

use driver::CollaboratorError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, UiTreeError>;

#[derive(Debug, Error)]
pub enum UiTreeError {
    #[error("Node not found: {0}")]
    NodeNotFound(u32),

    #[error("No node with uid {0:?}")]
    UidNotFound(String),

    #[error("Tree has no root node")]
    NoRoot,

    #[error("Invalid hierarchy dump: {0}")]
    InvalidDump(String),

    #[error("Unsupported locator strategy: {0}")]
    UnsupportedStrategy(String),

    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),
}

impl From<UiTreeError> for CollaboratorError {
    fn from(err: UiTreeError) -> Self {
        match err {
            UiTreeError::UnsupportedStrategy(name) => CollaboratorError::UnsupportedStrategy(name),
            other => CollaboratorError::Traversal(other.to_string()),
        }
    }
}
