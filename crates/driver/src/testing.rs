//! Test doubles: fake UI trees and a clock that never really sleeps

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::clock::Clock;
use crate::introspect::{CollaboratorError, Locator, UiIntrospector};

/// Clock whose `sleep` just moves virtual time forward
#[derive(Default)]
pub struct ManualClock {
    nanos: AtomicU64,
    sleeps: AtomicUsize,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, duration: Duration) {
        self.nanos
            .fetch_add(duration.as_nanos() as u64, Ordering::SeqCst);
    }

    pub fn sleeps(&self) -> usize {
        self.sleeps.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.fetch_add(1, Ordering::SeqCst);
        self.advance(duration);
        tokio::task::yield_now().await;
    }
}

/// Static tree given as `(parent, child)` edges, rooted at 0.
/// Only the `name` strategy is understood.
pub struct TreeUi {
    children: HashMap<u32, Vec<u32>>,
    names: HashMap<u32, String>,
}

impl TreeUi {
    pub fn new(edges: &[(u32, u32)]) -> Self {
        let mut children: HashMap<u32, Vec<u32>> = HashMap::new();
        for &(parent, child) in edges {
            children.entry(parent).or_default().push(child);
        }
        Self {
            children,
            names: HashMap::new(),
        }
    }

    pub fn named(mut self, names: &[(u32, &str)]) -> Self {
        for &(node, name) in names {
            self.names.insert(node, name.to_string());
        }
        self
    }
}

impl UiIntrospector for TreeUi {
    type Handle = u32;
    type Identity = u32;

    fn default_root(&self) -> u32 {
        0
    }

    fn validate_locator(&self, locator: &Locator) -> Result<(), CollaboratorError> {
        match locator.using.as_str() {
            "name" => Ok(()),
            other => Err(CollaboratorError::UnsupportedStrategy(other.to_string())),
        }
    }

    fn list_children(&self, handle: &u32) -> Result<Vec<u32>, CollaboratorError> {
        Ok(self.children.get(handle).cloned().unwrap_or_default())
    }

    fn matches_locator(&self, handle: &u32, locator: &Locator) -> Result<bool, CollaboratorError> {
        self.validate_locator(locator)?;
        Ok(self.names.get(handle).map(String::as_str) == Some(locator.value.as_str()))
    }

    fn stable_identity_of(&self, handle: &u32) -> u32 {
        *handle
    }
}

/// Returns a scripted result per attempt: attempt `n` sees `results[n]`
/// (the last entry repeats). Every scripted object matches any locator,
/// except that the strategy `bogus` fails.
pub struct ScriptedUi {
    results: Vec<Vec<u32>>,
    attempts: Arc<AtomicUsize>,
}

impl ScriptedUi {
    pub fn new(results: Vec<Vec<u32>>) -> Self {
        Self {
            results,
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared attempt counter, readable after the stub moves to the UI thread
    pub fn attempts(&self) -> Arc<AtomicUsize> {
        self.attempts.clone()
    }
}

impl UiIntrospector for ScriptedUi {
    type Handle = u32;
    type Identity = u32;

    fn default_root(&self) -> u32 {
        0
    }

    fn list_children(&self, handle: &u32) -> Result<Vec<u32>, CollaboratorError> {
        if *handle != 0 {
            return Ok(Vec::new());
        }
        let n = self.attempts.fetch_add(1, Ordering::SeqCst);
        let last = self.results.len().saturating_sub(1);
        Ok(self.results.get(n.min(last)).cloned().unwrap_or_default())
    }

    fn validate_locator(&self, locator: &Locator) -> Result<(), CollaboratorError> {
        if locator.using == "bogus" {
            return Err(CollaboratorError::UnsupportedStrategy(locator.using.clone()));
        }
        Ok(())
    }

    fn matches_locator(&self, _handle: &u32, locator: &Locator) -> Result<bool, CollaboratorError> {
        self.validate_locator(locator)?;
        Ok(true)
    }

    fn stable_identity_of(&self, handle: &u32) -> u32 {
        *handle
    }
}
