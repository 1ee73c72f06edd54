//! UI Introspection - the narrow seam to the platform widget tree
//!
//! The driver never looks at widgets itself. Everything it knows about the
//! live UI comes through these four calls, and all of them run on the UI
//! thread (see [`crate::ui_thread`]).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::hash::Hash;
use thiserror::Error;

use crate::error::{DriverError, Result};

/// Failures raised by the collaborator. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    #[error("Unsupported locator strategy: {0}")]
    UnsupportedStrategy(String),

    #[error("UI traversal failed: {0}")]
    Traversal(String),
}

/// How to match a UI object: `(strategy, value)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    pub using: String,
    pub value: String,
}

impl Locator {
    pub fn new(using: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            using: using.into(),
            value: value.into(),
        }
    }

    /// Parse the `{using, value}` body of a find command
    pub fn from_body(body: &Value) -> Result<Self> {
        let field = |name: &str| {
            body.get(name)
                .and_then(Value::as_str)
                .map(String::from)
                .ok_or_else(|| {
                    DriverError::InvalidArgument(format!("missing string parameter '{name}'"))
                })
        };

        Ok(Self {
            using: field("using")?,
            value: field("value")?,
        })
    }
}

/// Capability interface over a live UI object graph
///
/// Implementors are moved onto the UI thread and only ever touched there, so
/// they need `Send` but not `Sync`.
pub trait UiIntrospector: Send + 'static {
    /// Opaque reference to a UI object
    type Handle: Clone + Send + Sync + 'static;

    /// Identity key used to deduplicate handles
    type Identity: Eq + Hash + Send + Sync + 'static;

    fn default_root(&self) -> Self::Handle;

    /// Reject a locator this collaborator cannot evaluate. Called before
    /// any traversal, so a bad strategy fails even on an empty subtree.
    fn validate_locator(&self, locator: &Locator) -> std::result::Result<(), CollaboratorError>;

    /// Direct children, in display order
    fn list_children(
        &self,
        handle: &Self::Handle,
    ) -> std::result::Result<Vec<Self::Handle>, CollaboratorError>;

    fn matches_locator(
        &self,
        handle: &Self::Handle,
        locator: &Locator,
    ) -> std::result::Result<bool, CollaboratorError>;

    fn stable_identity_of(&self, handle: &Self::Handle) -> Self::Identity;
}
