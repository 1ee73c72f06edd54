//! Virtual Directory - path-addressed routing nodes
//!
//! A node may own named static children (`Mounts`) and may also resolve
//! dynamic children from an id segment. Per segment, static children win;
//! the dynamic resolver is only asked when no static child matches.
//!
//! Routing never does UI work. It walks to a leaf and hands the command to
//! that leaf's `handle`.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

use crate::error::{DriverError, Result};
use crate::protocol::{Command, Reply, Request};

#[async_trait]
pub trait VirtualDirectory: Send + Sync {
    /// Static children, if this node has any
    fn mounts(&self) -> Option<&Mounts> {
        None
    }

    /// Resolve a child from an id-like segment
    fn resolve_dynamic(&self, _segment: &str) -> Option<Arc<dyn VirtualDirectory>> {
        None
    }

    /// Handle a command addressed at this node itself
    async fn handle(&self, command: Command<'_>) -> Result<Reply> {
        Err(DriverError::unknown_command(&command))
    }
}

/// Named static children of a node
#[derive(Default)]
pub struct Mounts {
    children: DashMap<String, Arc<dyn VirtualDirectory>>,
}

impl Mounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form for nodes that set up their children at construction
    pub fn with(self, segment: &str, child: Arc<dyn VirtualDirectory>) -> Self {
        self.children.insert(segment.to_string(), child);
        self
    }

    /// Mount `child` at `segment`. A segment can only be claimed once.
    pub fn mount(&self, segment: impl Into<String>, child: Arc<dyn VirtualDirectory>) -> Result<()> {
        match self.children.entry(segment.into()) {
            Entry::Occupied(entry) => Err(DriverError::AlreadyMounted(entry.key().clone())),
            Entry::Vacant(entry) => {
                tracing::debug!("Mounted /{}", entry.key());
                entry.insert(child);
                Ok(())
            }
        }
    }

    pub fn unmount(&self, segment: &str) -> Option<Arc<dyn VirtualDirectory>> {
        let removed = self.children.remove(segment).map(|(_, child)| child);
        if removed.is_some() {
            tracing::debug!("Unmounted /{}", segment);
        }
        removed
    }

    pub fn get(&self, segment: &str) -> Option<Arc<dyn VirtualDirectory>> {
        self.children.get(segment).map(|child| child.value().clone())
    }
}

/// A node that is nothing but its static children
#[derive(Default)]
pub struct StaticDirectory {
    mounts: Mounts,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_mounts(mounts: Mounts) -> Self {
        Self { mounts }
    }

    pub fn mount(&self, segment: impl Into<String>, child: Arc<dyn VirtualDirectory>) -> Result<()> {
        self.mounts.mount(segment, child)
    }

    pub fn unmount(&self, segment: &str) -> Option<Arc<dyn VirtualDirectory>> {
        self.mounts.unmount(segment)
    }
}

impl VirtualDirectory for StaticDirectory {
    fn mounts(&self) -> Option<&Mounts> {
        Some(&self.mounts)
    }
}

/// Find the child of `node` named by `segment`
pub fn resolve_child(node: &dyn VirtualDirectory, segment: &str) -> Option<Arc<dyn VirtualDirectory>> {
    node.mounts()
        .and_then(|mounts| mounts.get(segment))
        .or_else(|| node.resolve_dynamic(segment))
}

/// Route `request` from `root` down its path and run the leaf's handler
///
/// Iterative walk, one segment at a time. Any segment that resolves to
/// nothing ends the walk with `RoutingNotFound`.
pub async fn dispatch(root: Arc<dyn VirtualDirectory>, request: &Request) -> Result<Reply> {
    let mut node = root;

    for segment in request.segments() {
        let child = resolve_child(node.as_ref(), segment)
            .ok_or_else(|| DriverError::RoutingNotFound(request.path.clone()))?;
        node = child;
    }

    node.handle(Command::new(request)).await
}
