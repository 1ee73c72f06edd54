//! Core type definitions for UI objects
//!
//! Key design principles:
//! 1. Use u32 for indices (4 bytes vs 8 bytes pointer)
//! 2. Use SmallVec for child lists (most widgets have few children)
//! 3. Every node carries a stable `uid` that survives re-dumps of the tree

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;

/// Node identifier (index into arena)
pub type NodeId = u32;

/// Screen rectangle of a widget
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Frame {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// One UI object (a view, a window, a control)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiNode {
    pub node_id: NodeId,

    // Navigation indices
    pub parent_id: Option<NodeId>,
    pub children_ids: SmallVec<[NodeId; 4]>,

    /// Widget class, e.g. "UIButton" or "android.widget.TextView"
    pub kind: String,

    /// Developer-assigned identifier
    pub id: Option<String>,

    /// Accessibility label
    pub name: Option<String>,

    /// Displayed text
    pub text: Option<String>,

    pub attributes: HashMap<String, String>,
    pub visible: bool,
    pub frame: Option<Frame>,

    /// Stable identity, used to deduplicate handles
    pub uid: String,
}

impl UiNode {
    pub fn new(node_id: NodeId, kind: impl Into<String>) -> Self {
        Self {
            node_id,
            parent_id: None,
            children_ids: SmallVec::new(),
            kind: kind.into(),
            id: None,
            name: None,
            text: None,
            attributes: HashMap::new(),
            visible: true,
            frame: None,
            uid: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}
