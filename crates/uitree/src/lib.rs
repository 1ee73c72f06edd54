//! UI Tree - an arena-backed widget hierarchy for the driver
//!
//! Loads a JSON view-hierarchy dump and answers the driver's introspection
//! calls against it.
//!
//! ## Core Design
//!
//! ```text
//! JSON dump → UiTreeLoader → UiArena (owned) → UiTree → driver::UiIntrospector
//!                                ↓
//!                          NodeId (u32)
//! ```

pub mod arena;
pub mod error;
pub mod loader;
pub mod locator;
pub mod tree;
pub mod types;

pub use arena::UiArena;
pub use error::{Result, UiTreeError};
pub use loader::UiTreeLoader;
pub use locator::Strategy;
pub use tree::UiTree;
pub use types::{Frame, NodeId, UiNode};
