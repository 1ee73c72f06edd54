//! Automation Session
//!
//! One session per `/session/{id}`. Owns its element store and implicit-wait
//! setting. Holds only a weak reference to the session root, so it never
//! keeps the root alive and never assumes the root is still there.
//!
//! Directory layout under a session:
//!
//! ```text
//! /session/{id}                      GET capabilities, DELETE session
//!     /element                       POST find one
//!     /element/{e}/element           POST find one under e
//!     /element/{e}/elements          POST find all under e
//!     /elements                      POST find all
//!     /timeouts/implicit_wait        POST {"ms": n}
//! ```

use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use crate::clock::Clock;
use crate::element_store::ElementStore;
use crate::error::{DriverError, Result};
use crate::events::{DriverEvent, EventBus};
use crate::find::{FindContext, FindQuery};
use crate::introspect::{Locator, UiIntrospector};
use crate::protocol::{Command, ElementId, Method, Reply, SessionId};
use crate::session_root::SessionRoot;
use crate::ui_thread::UiThread;
use crate::vdir::{Mounts, StaticDirectory, VirtualDirectory};

/// What a session inherits from its root at creation
pub struct SessionSettings<U> {
    pub ui: UiThread<U>,
    pub clock: Arc<dyn Clock>,
    pub events: EventBus,
    pub poll_interval: Duration,
    pub implicit_wait: Duration,
    pub first_element_id: ElementId,
    pub capabilities: Value,
}

pub struct Session<U: UiIntrospector> {
    id: SessionId,
    root: Weak<SessionRoot<U>>,
    elements: ElementStore<U>,
    implicit_wait_ms: AtomicU64,
    deleted: AtomicBool,
    mounts: Mounts,

    ui: UiThread<U>,
    clock: Arc<dyn Clock>,
    events: EventBus,
    poll_interval: Duration,
    capabilities: Value,
}

impl<U: UiIntrospector> Session<U> {
    pub fn new(root: Weak<SessionRoot<U>>, id: SessionId, settings: SessionSettings<U>) -> Arc<Self> {
        Arc::new_cyclic(|me: &Weak<Self>| {
            let timeouts = StaticDirectory::from_mounts(
                Mounts::new().with("implicit_wait", Arc::new(ImplicitWaitNode { session: me.clone() })),
            );

            let mounts = Mounts::new()
                .with("element", Arc::new(FindDirectory::new(me.clone(), None, FindMode::Single)))
                .with("elements", Arc::new(FindDirectory::new(me.clone(), None, FindMode::All)))
                .with("timeouts", Arc::new(timeouts));

            Self {
                id,
                root,
                elements: ElementStore::new(settings.first_element_id),
                implicit_wait_ms: AtomicU64::new(settings.implicit_wait.as_millis() as u64),
                deleted: AtomicBool::new(false),
                mounts,
                ui: settings.ui,
                clock: settings.clock,
                events: settings.events,
                poll_interval: settings.poll_interval,
                capabilities: settings.capabilities,
            }
        })
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn implicit_wait(&self) -> Duration {
        Duration::from_millis(self.implicit_wait_ms.load(Ordering::SeqCst))
    }

    pub fn set_implicit_wait(&self, wait: Duration) {
        let millis = wait.as_millis() as u64;
        self.implicit_wait_ms.store(millis, Ordering::SeqCst);
        tracing::debug!(session_id = self.id, millis, "Implicit wait changed");
        self.events.publish(DriverEvent::ImplicitWaitChanged {
            session_id: self.id,
            millis,
        });
    }

    pub fn element_store(&self) -> &ElementStore<U> {
        &self.elements
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted.load(Ordering::SeqCst)
    }

    /// Delete this session. Only the first call does anything.
    pub fn delete_session(&self) {
        if self.deleted.swap(true, Ordering::SeqCst) {
            return;
        }

        if let Some(root) = self.root.upgrade() {
            root.delete_session_with_id(self.id);
        }
        self.elements.clear();

        tracing::info!(session_id = self.id, "Session deleted");
        self.events.publish(DriverEvent::SessionDeleted { session_id: self.id });
    }

    /// Find context carrying this session's current implicit wait
    pub fn find_context(&self) -> FindContext<'_, U> {
        FindContext {
            ui: &self.ui,
            clock: self.clock.as_ref(),
            implicit_wait: self.implicit_wait(),
            poll_interval: self.poll_interval,
        }
    }

    pub async fn find_element(&self, query: &FindQuery) -> Result<Value> {
        let element = self
            .elements
            .find_element(query, &self.find_context())
            .await?;
        self.publish_found(vec![element.element]);
        Ok(serde_json::to_value(element)?)
    }

    pub async fn find_elements(&self, query: &FindQuery) -> Result<Value> {
        let elements = self
            .elements
            .find_elements(query, &self.find_context())
            .await?;
        self.publish_found(elements.iter().map(|e| e.element).collect());
        Ok(serde_json::to_value(elements)?)
    }

    fn publish_found(&self, element_ids: Vec<ElementId>) {
        self.events.publish(DriverEvent::ElementsFound {
            session_id: self.id,
            element_ids,
        });
    }
}

#[async_trait]
impl<U: UiIntrospector> VirtualDirectory for Session<U> {
    fn mounts(&self) -> Option<&Mounts> {
        if self.is_deleted() {
            None
        } else {
            Some(&self.mounts)
        }
    }

    async fn handle(&self, command: Command<'_>) -> Result<Reply> {
        if self.is_deleted() {
            return Err(DriverError::RoutingNotFound(command.path.to_string()));
        }

        match command.method {
            Method::Get => Ok(Reply::Value(self.capabilities.clone())),
            Method::Delete => {
                self.delete_session();
                Ok(Reply::Empty)
            }
            _ => Err(DriverError::unknown_command(&command)),
        }
    }
}

/// Upgrade a child's weak session link, treating a dead or deleted session
/// as a path that no longer exists
fn live_session<U: UiIntrospector>(session: &Weak<Session<U>>, path: &str) -> Result<Arc<Session<U>>> {
    session
        .upgrade()
        .filter(|s| !s.is_deleted())
        .ok_or_else(|| DriverError::RoutingNotFound(path.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FindMode {
    Single,
    All,
}

/// `/element` and `/elements`, optionally rooted at an element
struct FindDirectory<U: UiIntrospector> {
    session: Weak<Session<U>>,
    root: Option<ElementId>,
    mode: FindMode,
}

impl<U: UiIntrospector> FindDirectory<U> {
    fn new(session: Weak<Session<U>>, root: Option<ElementId>, mode: FindMode) -> Self {
        Self { session, root, mode }
    }
}

#[async_trait]
impl<U: UiIntrospector> VirtualDirectory for FindDirectory<U> {
    /// `/element/{e}` - only at the session level, only for known ids
    fn resolve_dynamic(&self, segment: &str) -> Option<Arc<dyn VirtualDirectory>> {
        if self.mode != FindMode::Single || self.root.is_some() {
            return None;
        }

        let id: ElementId = segment.parse().ok()?;
        let session = self.session.upgrade().filter(|s| !s.is_deleted())?;
        if !session.element_store().contains(id) {
            return None;
        }

        Some(Arc::new(ElementNode::new(self.session.clone(), id)) as Arc<dyn VirtualDirectory>)
    }

    async fn handle(&self, command: Command<'_>) -> Result<Reply> {
        if command.method != Method::Post {
            return Err(DriverError::unknown_command(&command));
        }

        let session = live_session(&self.session, command.path)?;
        let mut query = FindQuery::new(Locator::from_body(command.body)?);
        if let Some(root) = self.root {
            query = query.under(root);
        }

        let value = match self.mode {
            FindMode::Single => session.find_element(&query).await?,
            FindMode::All => session.find_elements(&query).await?,
        };
        Ok(Reply::Value(value))
    }
}

/// `/element/{e}` - scope for finds rooted at element `e`
struct ElementNode {
    mounts: Mounts,
}

impl ElementNode {
    fn new<U: UiIntrospector>(session: Weak<Session<U>>, id: ElementId) -> Self {
        let mounts = Mounts::new()
            .with(
                "element",
                Arc::new(FindDirectory::new(session.clone(), Some(id), FindMode::Single)),
            )
            .with(
                "elements",
                Arc::new(FindDirectory::new(session, Some(id), FindMode::All)),
            );
        Self { mounts }
    }
}

impl VirtualDirectory for ElementNode {
    fn mounts(&self) -> Option<&Mounts> {
        Some(&self.mounts)
    }
}

/// `/timeouts/implicit_wait`
struct ImplicitWaitNode<U: UiIntrospector> {
    session: Weak<Session<U>>,
}

#[async_trait]
impl<U: UiIntrospector> VirtualDirectory for ImplicitWaitNode<U> {
    async fn handle(&self, command: Command<'_>) -> Result<Reply> {
        if command.method != Method::Post {
            return Err(DriverError::unknown_command(&command));
        }

        let session = live_session(&self.session, command.path)?;
        let millis = command
            .body
            .get("ms")
            .and_then(Value::as_f64)
            .filter(|ms| ms.is_finite() && *ms >= 0.0)
            .ok_or_else(|| {
                DriverError::InvalidArgument("'ms' must be a non-negative number".to_string())
            })?;

        session.set_implicit_wait(Duration::from_millis(millis as u64));
        Ok(Reply::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DriverConfig;
    use crate::testing::{ManualClock, TreeUi};
    use crate::vdir::dispatch;
    use crate::protocol::Request;
    use serde_json::json;

    fn root() -> Arc<SessionRoot<TreeUi>> {
        // 0 -> [1 "foo" -> [3 "bar"], 2 "foo"]
        let ui = TreeUi::new(&[(0, 1), (0, 2), (1, 3)]).named(&[(1, "foo"), (2, "foo"), (3, "bar")]);
        SessionRoot::new(
            UiThread::spawn(ui).unwrap(),
            Arc::new(ManualClock::new()),
            DriverConfig::default(),
            EventBus::new(),
        )
    }

    fn post(path: &str, body: Value) -> Request {
        Request::new(Method::Post, path).with_body(body)
    }

    #[tokio::test]
    async fn test_delete_session_is_idempotent() {
        let root = root();
        let mut events = root.events().subscribe();
        root.create_session(&Value::Null, Method::Post).unwrap();
        let session = root.session(1).unwrap();

        session.delete_session();
        session.delete_session();
        session.delete_session();

        assert!(session.is_deleted());
        assert!(root.session(1).is_none());

        let mut deleted = 0;
        while let Ok(event) = events.try_recv() {
            if matches!(event, DriverEvent::SessionDeleted { session_id: 1 }) {
                deleted += 1;
            }
        }
        assert_eq!(deleted, 1);
    }

    #[tokio::test]
    async fn test_implicit_wait_defaults_and_updates() {
        let root = root();
        root.create_session(&Value::Null, Method::Post).unwrap();
        let session = root.session(1).unwrap();
        assert_eq!(session.implicit_wait(), Duration::ZERO);

        let reply = dispatch(
            root.clone(),
            &post("/1/timeouts/implicit_wait", json!({ "ms": 1500 })),
        )
        .await
        .unwrap();
        assert_eq!(reply, Reply::Empty);
        assert_eq!(session.implicit_wait(), Duration::from_millis(1500));

        let err = dispatch(
            root.clone(),
            &post("/1/timeouts/implicit_wait", json!({ "ms": -1 })),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DriverError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_nested_find_under_element() {
        let root = root();
        root.create_session(&Value::Null, Method::Post).unwrap();

        let reply = dispatch(
            root.clone(),
            &post("/1/element", json!({ "using": "name", "value": "foo" })),
        )
        .await
        .unwrap();
        assert_eq!(reply, Reply::Value(json!({ "ELEMENT": 1 })));

        let reply = dispatch(
            root.clone(),
            &post("/1/element/1/elements", json!({ "using": "name", "value": "bar" })),
        )
        .await
        .unwrap();
        assert_eq!(reply, Reply::Value(json!([{ "ELEMENT": 2 }])));

        // 2 "foo" is not under 1
        let reply = dispatch(
            root.clone(),
            &post("/1/element/1/elements", json!({ "using": "name", "value": "foo" })),
        )
        .await
        .unwrap();
        assert_eq!(reply, Reply::Value(json!([])));

        let err = dispatch(
            root.clone(),
            &post("/1/element/77/element", json!({ "using": "name", "value": "bar" })),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DriverError::RoutingNotFound(_)));
    }

    #[tokio::test]
    async fn test_deleted_session_children_are_gone() {
        let root = root();
        root.create_session(&Value::Null, Method::Post).unwrap();
        let session = root.session(1).unwrap();
        let finder = session.mounts().unwrap().get("elements").unwrap();

        session.delete_session();

        let body = json!({ "using": "name", "value": "foo" });
        let request = post("/session/1/elements", body);
        let err = finder.handle(Command::new(&request)).await.unwrap_err();
        assert!(matches!(err, DriverError::RoutingNotFound(_)));
    }
}
