//! Arena-based UI tree storage
//!
//! All nodes live in one Vec and refer to each other by u32 index.
//! No Rc/Arc. A uid index maps stable identities back to slots.
//!
//! ```text
//! Arena: Vec<UiNode>
//!        [Node0][Node1][Node2]...
//!         ↑ 4-byte index, not 8-byte pointer
//! ```

use crate::error::{Result, UiTreeError};
use crate::types::{NodeId, UiNode};
use ahash::AHashMap;

/// Arena allocator for UI nodes
///
/// - Single Vec<UiNode> for sequential allocation
/// - uid → NodeId lookup so a handle can be recovered from a stable identity
#[derive(Debug)]
pub struct UiArena {
    nodes: Vec<UiNode>,
    uid_map: AHashMap<String, NodeId>,
    root_id: Option<NodeId>,
}

impl UiArena {
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            uid_map: AHashMap::with_capacity(capacity),
            root_id: None,
        }
    }

    /// Add a detached node. Its `node_id` is overwritten with the arena index.
    pub fn add_node(&mut self, mut node: UiNode) -> NodeId {
        let node_id = self.nodes.len() as NodeId;
        node.node_id = node_id;
        self.uid_map.insert(node.uid.clone(), node_id);
        self.nodes.push(node);
        node_id
    }

    /// Add `node` as the last child of `parent_id`
    pub fn append_child(&mut self, parent_id: NodeId, mut node: UiNode) -> Result<NodeId> {
        self.get(parent_id)?;
        node.parent_id = Some(parent_id);
        let child_id = self.add_node(node);
        self.get_mut(parent_id)?.children_ids.push(child_id);
        Ok(child_id)
    }

    pub fn get(&self, node_id: NodeId) -> Result<&UiNode> {
        self.nodes
            .get(node_id as usize)
            .ok_or(UiTreeError::NodeNotFound(node_id))
    }

    pub fn get_mut(&mut self, node_id: NodeId) -> Result<&mut UiNode> {
        self.nodes
            .get_mut(node_id as usize)
            .ok_or(UiTreeError::NodeNotFound(node_id))
    }

    pub fn get_by_uid(&self, uid: &str) -> Option<NodeId> {
        self.uid_map.get(uid).copied()
    }

    pub fn set_root(&mut self, node_id: NodeId) -> Result<()> {
        self.get(node_id)?;
        self.root_id = Some(node_id);
        Ok(())
    }

    pub fn root_id(&self) -> Option<NodeId> {
        self.root_id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UiNode> {
        self.nodes.iter()
    }

    pub fn children(&self, node_id: NodeId) -> Result<&[NodeId]> {
        Ok(&self.get(node_id)?.children_ids)
    }
}

impl Default for UiArena {
    fn default() -> Self {
        Self::new()
    }
}
