//! Element Store - per-session registry of found UI objects
//!
//! Hands out integer ids for UI object handles. An id, once issued, keeps
//! pointing at the same handle for the life of the session, even after the
//! widget behind it has gone away. Handles are deduplicated by identity, so
//! finding the same object twice yields the same id.

use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{DriverError, Result};
use crate::find::{self, FindContext, FindQuery};
use crate::introspect::UiIntrospector;
use crate::protocol::{ElementId, ElementRef};

pub struct ElementStore<U: UiIntrospector> {
    /// Monotonic element id counter
    next_id: AtomicU64,

    /// Element id → handle
    handles: DashMap<ElementId, U::Handle>,

    /// Identity → element id, for dedup on registration
    identities: DashMap<U::Identity, ElementId>,
}

impl<U: UiIntrospector> ElementStore<U> {
    pub fn new(first_id: ElementId) -> Self {
        Self {
            next_id: AtomicU64::new(first_id),
            handles: DashMap::new(),
            identities: DashMap::new(),
        }
    }

    /// Register `handle`, or return the id it already has
    pub fn register_handle(&self, handle: U::Handle, identity: U::Identity) -> ElementId {
        let id = *self.identities.entry(identity).or_insert_with(|| {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            self.handles.insert(id, handle);
            tracing::trace!(element_id = id, "Registered element");
            id
        });
        id
    }

    pub fn resolve(&self, id: ElementId) -> Result<U::Handle> {
        self.handles
            .get(&id)
            .map(|handle| handle.value().clone())
            .ok_or(DriverError::StaleElementReference(id))
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.handles.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Drop every registration. The id counter keeps going.
    pub fn clear(&self) {
        self.identities.clear();
        self.handles.clear();
    }

    /// Find one element; `NoSuchElement` once the wait budget is spent
    pub async fn find_element(&self, query: &FindQuery, ctx: &FindContext<'_, U>) -> Result<ElementRef> {
        let root = self.resolve_root(query)?;
        let found = find::poll(ctx, root, &query.locator, Some(1)).await?;

        let first = found
            .into_iter()
            .next()
            .ok_or_else(|| DriverError::NoSuchElement {
                using: query.locator.using.clone(),
                value: query.locator.value.clone(),
            })?;

        Ok(ElementRef::new(self.register_handle(first.handle, first.identity)))
    }

    /// Find all matching elements. Empty is a valid answer.
    pub async fn find_elements(
        &self,
        query: &FindQuery,
        ctx: &FindContext<'_, U>,
    ) -> Result<Vec<ElementRef>> {
        let root = self.resolve_root(query)?;
        let found = find::poll(ctx, root, &query.locator, None).await?;

        let mut seen = HashSet::with_capacity(found.len());
        Ok(found
            .into_iter()
            .map(|located| self.register_handle(located.handle, located.identity))
            .filter(|id| seen.insert(*id))
            .map(ElementRef::new)
            .collect())
    }

    /// Unknown root ids fail here, before the UI is touched
    fn resolve_root(&self, query: &FindQuery) -> Result<Option<U::Handle>> {
        query.root.map(|id| self.resolve(id)).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Clock;
    use crate::introspect::{CollaboratorError, Locator};
    use crate::testing::{ManualClock, ScriptedUi};
    use crate::ui_thread::UiThread;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    const POLL: Duration = Duration::from_millis(100);

    fn context<'a>(
        ui: &'a UiThread<ScriptedUi>,
        clock: &'a ManualClock,
        implicit_wait: Duration,
    ) -> FindContext<'a, ScriptedUi> {
        FindContext {
            ui,
            clock,
            implicit_wait,
            poll_interval: POLL,
        }
    }

    fn query(using: &str) -> FindQuery {
        FindQuery::new(Locator::new(using, "foo"))
    }

    #[test]
    fn test_register_distinct_and_idempotent() {
        let store = ElementStore::<ScriptedUi>::new(1);

        let a = store.register_handle(10, 10);
        let b = store.register_handle(20, 20);
        assert_ne!(a, b);
        assert_eq!((a, b), (1, 2));

        assert_eq!(store.register_handle(10, 10), a);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_resolve_round_trip() {
        let store = ElementStore::<ScriptedUi>::new(100);
        let id = store.register_handle(7, 7);
        assert_eq!(id, 100);
        assert_eq!(store.resolve(id).unwrap(), 7);

        let err = store.resolve(999).unwrap_err();
        assert!(matches!(err, DriverError::StaleElementReference(999)));
    }

    #[test]
    fn test_ids_not_reused_after_clear() {
        let store = ElementStore::<ScriptedUi>::new(1);
        store.register_handle(1, 1);
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.register_handle(1, 1), 2);
    }

    #[tokio::test]
    async fn test_zero_wait_single_attempt() {
        let stub = ScriptedUi::new(vec![vec![]]);
        let attempts = stub.attempts();
        let ui = UiThread::spawn(stub).unwrap();
        let clock = ManualClock::new();
        let store = ElementStore::new(1);

        let found = store
            .find_elements(&query("name"), &context(&ui, &clock, Duration::ZERO))
            .await
            .unwrap();

        assert!(found.is_empty());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert_eq!(clock.sleeps(), 0);
    }

    #[tokio::test]
    async fn test_match_after_k_empty_attempts() {
        let stub = ScriptedUi::new(vec![vec![], vec![], vec![], vec![5, 6]]);
        let attempts = stub.attempts();
        let ui = UiThread::spawn(stub).unwrap();
        let clock = ManualClock::new();
        let store = ElementStore::new(1);

        let element = store
            .find_element(&query("name"), &context(&ui, &clock, Duration::from_secs(10)))
            .await
            .unwrap();

        assert_eq!(element, ElementRef::new(1));
        assert_eq!(store.resolve(1).unwrap(), 5);
        // Second match of that attempt was discarded
        assert_eq!(store.len(), 1);
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
        assert_eq!(clock.now(), POLL * 3);
    }

    #[tokio::test]
    async fn test_no_such_element_after_full_wait() {
        let stub = ScriptedUi::new(vec![vec![]]);
        let attempts = stub.attempts();
        let ui = UiThread::spawn(stub).unwrap();
        let clock = ManualClock::new();
        let store = ElementStore::new(1);
        let wait = Duration::from_millis(450);

        let err = store
            .find_element(&query("name"), &context(&ui, &clock, wait))
            .await
            .unwrap_err();

        assert!(matches!(err, DriverError::NoSuchElement { .. }));
        assert!(clock.now() >= wait);
        // Attempts at 0, 100, 200, 300, 400 and the overrunning one at 500
        assert_eq!(attempts.load(Ordering::SeqCst), 6);
        assert_eq!(clock.now(), Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_collaborator_failure_not_retried() {
        let stub = ScriptedUi::new(vec![vec![1]]);
        let attempts = stub.attempts();
        let ui = UiThread::spawn(stub).unwrap();
        let clock = ManualClock::new();
        let store = ElementStore::new(1);

        let err = store
            .find_element(&query("bogus"), &context(&ui, &clock, Duration::from_secs(10)))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DriverError::Collaborator(CollaboratorError::UnsupportedStrategy(_))
        ));
        // Rejected before the tree is walked
        assert_eq!(attempts.load(Ordering::SeqCst), 0);
        assert_eq!(clock.sleeps(), 0);
    }

    #[tokio::test]
    async fn test_collaborator_failure_on_empty_tree_keeps_wait_budget() {
        let stub = ScriptedUi::new(vec![vec![]]);
        let ui = UiThread::spawn(stub).unwrap();
        let clock = ManualClock::new();
        let store = ElementStore::new(1);

        let err = store
            .find_elements(&query("bogus"), &context(&ui, &clock, Duration::from_millis(500)))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DriverError::Collaborator(CollaboratorError::UnsupportedStrategy(_))
        ));
        assert_eq!(clock.sleeps(), 0);
        assert_eq!(clock.now(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_unknown_root_is_stale_before_searching() {
        let stub = ScriptedUi::new(vec![vec![1]]);
        let attempts = stub.attempts();
        let ui = UiThread::spawn(stub).unwrap();
        let clock = ManualClock::new();
        let store = ElementStore::new(1);

        let err = store
            .find_element(&query("name").under(42), &context(&ui, &clock, Duration::ZERO))
            .await
            .unwrap_err();

        assert!(matches!(err, DriverError::StaleElementReference(42)));
        assert_eq!(attempts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_find_elements_dedups_and_keeps_order() {
        let ui = UiThread::spawn(ScriptedUi::new(vec![vec![8, 3, 8, 5]])).unwrap();
        let clock = ManualClock::new();
        let store = ElementStore::new(1);
        let ctx = context(&ui, &clock, Duration::ZERO);

        // 3 is already known from an earlier find
        store.register_handle(3, 3);

        let found = store.find_elements(&query("name"), &ctx).await.unwrap();
        let ids: Vec<_> = found.iter().map(|e| e.element).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }
}
