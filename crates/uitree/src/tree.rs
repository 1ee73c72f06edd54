//! UiTree - a UI object graph the driver can search
//!
//! Wraps a [`UiArena`] and exposes it through [`driver::UiIntrospector`].
//! Handles are node uids, not arena slots: a reload may move a widget to a
//! different slot, but its uid keeps pointing at it. A uid missing from the
//! current tree fails with a traversal error.

use driver::{CollaboratorError, Locator, UiIntrospector};
use serde_json::Value;

use crate::arena::UiArena;
use crate::error::{Result, UiTreeError};
use crate::loader::UiTreeLoader;
use crate::locator::Strategy;
use crate::types::{NodeId, UiNode};

#[derive(Debug, Default)]
pub struct UiTree {
    arena: UiArena,
    /// Only visible nodes are listed as children
    visible_only: bool,
}

impl UiTree {
    pub fn new(arena: UiArena) -> Self {
        Self {
            arena,
            visible_only: false,
        }
    }

    pub fn from_json(dump: &str) -> Result<Self> {
        Ok(Self::new(UiTreeLoader::from_json(dump)?))
    }

    pub fn from_value(dump: &Value) -> Result<Self> {
        Ok(Self::new(UiTreeLoader::from_value(dump)?))
    }

    pub fn visible_only(mut self, visible_only: bool) -> Self {
        self.visible_only = visible_only;
        self
    }

    /// Swap in a fresh dump. A failed reload keeps the current tree.
    pub fn reload(&mut self, dump: &Value) -> Result<NodeId> {
        UiTreeLoader::load_into(&mut self.arena, dump)
    }

    pub fn arena(&self) -> &UiArena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut UiArena {
        &mut self.arena
    }

    pub fn node(&self, uid: &str) -> Result<&UiNode> {
        let node_id = self
            .arena
            .get_by_uid(uid)
            .ok_or_else(|| UiTreeError::UidNotFound(uid.to_string()))?;
        self.arena.get(node_id)
    }
}

impl UiIntrospector for UiTree {
    type Handle = String;
    type Identity = String;

    fn default_root(&self) -> String {
        // An empty tree yields a handle that fails on first use
        self.arena
            .root_id()
            .and_then(|id| self.arena.get(id).ok())
            .map(|node| node.uid.clone())
            .unwrap_or_default()
    }

    fn validate_locator(&self, locator: &Locator) -> std::result::Result<(), CollaboratorError> {
        locator.using.parse::<Strategy>()?;
        Ok(())
    }

    fn list_children(&self, handle: &String) -> std::result::Result<Vec<String>, CollaboratorError> {
        let node = self.node(handle)?;

        let mut children = Vec::with_capacity(node.children_ids.len());
        for &child_id in &node.children_ids {
            let child = self.arena.get(child_id)?;
            if child.visible || !self.visible_only {
                children.push(child.uid.clone());
            }
        }
        Ok(children)
    }

    fn matches_locator(
        &self,
        handle: &String,
        locator: &Locator,
    ) -> std::result::Result<bool, CollaboratorError> {
        let node = self.node(handle)?;
        Ok(crate::locator::matches(node, locator)?)
    }

    fn stable_identity_of(&self, handle: &String) -> String {
        handle.clone()
    }
}
