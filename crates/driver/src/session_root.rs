//! Session Root - the `/session` directory
//!
//! Creates sessions, hands out their ids and resolves `/session/{id}`.
//! Ids are strictly increasing and never reused, so a client holding a stale
//! id gets a 404 instead of someone else's session.

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use crate::clock::Clock;
use crate::config::DriverConfig;
use crate::error::{DriverError, Result};
use crate::events::{DriverEvent, EventBus};
use crate::introspect::UiIntrospector;
use crate::protocol::{Command, Method, Reply, SessionId};
use crate::session::{Session, SessionSettings};
use crate::ui_thread::UiThread;
use crate::vdir::VirtualDirectory;

pub struct SessionRoot<U: UiIntrospector> {
    me: Weak<Self>,
    first_id: SessionId,
    next_id: AtomicU64,
    sessions: DashMap<SessionId, Arc<Session<U>>>,

    ui: UiThread<U>,
    clock: Arc<dyn Clock>,
    config: DriverConfig,
    events: EventBus,
}

impl<U: UiIntrospector> SessionRoot<U> {
    pub fn new(ui: UiThread<U>, clock: Arc<dyn Clock>, config: DriverConfig, events: EventBus) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            first_id: config.first_session_id,
            next_id: AtomicU64::new(config.first_session_id),
            sessions: DashMap::new(),
            ui,
            clock,
            config,
            events,
        })
    }

    /// Create a session and redirect to it
    ///
    /// Only POST and its GET alias create; anything else is `MethodNotAllowed`.
    /// Requested capabilities are not consulted.
    pub fn create_session(&self, _desired_capabilities: &Value, method: Method) -> Result<Reply> {
        if !matches!(method, Method::Post | Method::Get) {
            return Err(DriverError::MethodNotAllowed(method));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let session = Session::new(
            self.me.clone(),
            id,
            SessionSettings {
                ui: self.ui.clone(),
                clock: self.clock.clone(),
                events: self.events.clone(),
                poll_interval: self.config.poll_interval(),
                implicit_wait: self.config.default_implicit_wait(),
                first_element_id: self.config.first_element_id,
                capabilities: self.config.capabilities.clone(),
            },
        );
        self.sessions.insert(id, session);

        tracing::info!(session_id = id, "Session created");
        self.events.publish(DriverEvent::SessionCreated { session_id: id });

        Ok(Reply::Redirect(format!("/session/{id}")))
    }

    /// Remove `/session/{id}`. Unknown ids are a no-op.
    pub fn delete_session_with_id(&self, id: SessionId) {
        // Bind first so the map shard is unlocked before the session runs
        let removed = self.sessions.remove(&id);
        if let Some((_, session)) = removed {
            tracing::debug!(session_id = id, "Unmounted session");
            session.delete_session();
        }
    }

    pub fn session(&self, id: SessionId) -> Option<Arc<Session<U>>> {
        self.sessions.get(&id).map(|s| s.value().clone())
    }

    /// Live session ids, ascending
    pub fn session_ids(&self) -> Vec<SessionId> {
        let mut ids: Vec<_> = self.sessions.iter().map(|s| *s.key()).collect();
        ids.sort_unstable();
        ids
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    fn was_issued(&self, id: SessionId) -> bool {
        id >= self.first_id && id < self.next_id.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<U: UiIntrospector> VirtualDirectory for SessionRoot<U> {
    fn resolve_dynamic(&self, segment: &str) -> Option<Arc<dyn VirtualDirectory>> {
        let id: SessionId = segment.parse().ok()?;

        if let Some(session) = self.session(id) {
            return Some(session as Arc<dyn VirtualDirectory>);
        }

        // Deleting an already-deleted session must still succeed
        self.was_issued(id).then(|| {
            Arc::new(RetiredSession {
                root: self.me.clone(),
                id,
            }) as Arc<dyn VirtualDirectory>
        })
    }

    async fn handle(&self, command: Command<'_>) -> Result<Reply> {
        self.create_session(command.body, command.method)
    }
}

/// Stand-in for a deleted session id: accepts DELETE, 404s everything else
struct RetiredSession<U: UiIntrospector> {
    root: Weak<SessionRoot<U>>,
    id: SessionId,
}

#[async_trait]
impl<U: UiIntrospector> VirtualDirectory for RetiredSession<U> {
    async fn handle(&self, command: Command<'_>) -> Result<Reply> {
        match command.method {
            Method::Delete => {
                if let Some(root) = self.root.upgrade() {
                    root.delete_session_with_id(self.id);
                }
                Ok(Reply::Empty)
            }
            _ => Err(DriverError::RoutingNotFound(command.path.to_string())),
        }
    }
}
