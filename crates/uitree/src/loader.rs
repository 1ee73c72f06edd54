//! Loader - builds a UiArena from a JSON view-hierarchy dump
//!
//! Input format:
//! ```json
//! {
//!   "root": {
//!     "kind": "Window",
//!     "id": "main",
//!     "name": "Main",
//!     "text": null,
//!     "attributes": { "enabled": "true" },
//!     "visible": true,
//!     "uid": "optional-stable-id",
//!     "frame": { "x": 0, "y": 0, "width": 320, "height": 480 },
//!     "children": [...]
//!   }
//! }
//! ```
//! Only `kind` is required. Nodes without a `uid` get a fresh one.

use serde_json::Value;
use std::collections::HashMap;

use crate::arena::UiArena;
use crate::error::{Result, UiTreeError};
use crate::types::{Frame, NodeId, UiNode};

pub struct UiTreeLoader;

impl UiTreeLoader {
    pub fn from_json(dump: &str) -> Result<UiArena> {
        let value: Value = serde_json::from_str(dump)?;
        Self::from_value(&value)
    }

    /// Build a fresh arena from `dump`
    pub fn from_value(dump: &Value) -> Result<UiArena> {
        let root = dump
            .get("root")
            .ok_or_else(|| UiTreeError::InvalidDump("missing 'root'".to_string()))?;

        let mut arena = UiArena::new();

        // Explicit stack: (json node, parent)
        let mut stack: Vec<(&Value, Option<NodeId>)> = vec![(root, None)];
        let mut root_id = None;

        while let Some((json, parent_id)) = stack.pop() {
            let node = Self::parse_node(json)?;
            if arena.get_by_uid(&node.uid).is_some() {
                return Err(UiTreeError::InvalidDump(format!("duplicate uid {:?}", node.uid)));
            }

            let node_id = match parent_id {
                Some(parent_id) => arena.append_child(parent_id, node)?,
                None => arena.add_node(node),
            };
            root_id.get_or_insert(node_id);

            if let Some(children) = json.get("children").and_then(Value::as_array) {
                for child in children.iter().rev() {
                    stack.push((child, Some(node_id)));
                }
            }
        }

        arena.set_root(root_id.ok_or(UiTreeError::NoRoot)?)?;
        Ok(arena)
    }

    /// Replace `arena` with `dump`, returning the new root.
    /// On error `arena` is left untouched.
    pub fn load_into(arena: &mut UiArena, dump: &Value) -> Result<NodeId> {
        let built = Self::from_value(dump)?;
        let root_id = built.root_id().ok_or(UiTreeError::NoRoot)?;
        *arena = built;
        Ok(root_id)
    }

    fn parse_node(json: &Value) -> Result<UiNode> {
        let kind = json
            .get("kind")
            .and_then(Value::as_str)
            .ok_or_else(|| UiTreeError::InvalidDump("node without 'kind'".to_string()))?;

        let text_field = |name: &str| json.get(name).and_then(Value::as_str).map(String::from);

        let mut node = UiNode::new(0, kind);
        node.id = text_field("id");
        node.name = text_field("name");
        node.text = text_field("text");
        node.visible = json.get("visible").and_then(Value::as_bool).unwrap_or(true);

        if let Some(uid) = text_field("uid") {
            node.uid = uid;
        }

        if let Some(attrs) = json.get("attributes").and_then(Value::as_object) {
            node.attributes = attrs
                .iter()
                .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                .collect::<HashMap<_, _>>();
        }

        if let Some(frame) = json.get("frame").filter(|f| !f.is_null()) {
            node.frame = Some(serde_json::from_value::<Frame>(frame.clone())?);
        }

        Ok(node)
    }
}
