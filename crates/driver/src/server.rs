//! Driver - the high-level entry point a transport talks to
//!
//! Owns the top of the directory tree (`/session` is mounted under it),
//! turns each request into a wire-format response and never panics on
//! bad input: unknown paths become 404s, failed commands become error
//! envelopes.

use std::sync::Arc;
use tokio::sync::broadcast;

use crate::clock::{Clock, TokioClock};
use crate::config::DriverConfig;
use crate::error::Result;
use crate::events::{DriverEvent, EventBus};
use crate::introspect::UiIntrospector;
use crate::protocol::{Request, Response};
use crate::session_root::SessionRoot;
use crate::ui_thread::UiThread;
use crate::vdir::{self, StaticDirectory};

pub struct Driver<U: UiIntrospector> {
    top: Arc<StaticDirectory>,
    sessions: Arc<SessionRoot<U>>,
    ui: UiThread<U>,
    events: EventBus,
}

impl<U: UiIntrospector> Driver<U> {
    /// Start a driver over `ui`, using real time
    pub fn new(ui: U, config: DriverConfig) -> Result<Self> {
        Self::with_clock(ui, config, Arc::new(TokioClock::new()))
    }

    pub fn with_clock(ui: U, config: DriverConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let ui = UiThread::spawn(ui)?;
        let events = EventBus::new();
        let sessions = SessionRoot::new(ui.clone(), clock, config, events.clone());

        let top = Arc::new(StaticDirectory::new());
        top.mount("session", sessions.clone())?;

        Ok(Self {
            top,
            sessions,
            ui,
            events,
        })
    }

    pub fn sessions(&self) -> &Arc<SessionRoot<U>> {
        &self.sessions
    }

    /// The UI thread, for callers that need to touch the live tree
    pub fn ui(&self) -> &UiThread<U> {
        &self.ui
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DriverEvent> {
        self.events.subscribe()
    }

    pub async fn handle(&self, request: Request) -> Response {
        let session_id = request.session_id();

        match vdir::dispatch(self.top.clone(), &request).await {
            Ok(reply) => Response::from_reply(session_id, reply),
            Err(err) => {
                if err.is_routing() {
                    tracing::debug!("{} {}: {}", request.method, request.path, err);
                } else {
                    tracing::warn!("{} {} failed: {}", request.method, request.path, err);
                }
                Response::from_error(session_id, &err)
            }
        }
    }
}
