//! Native UI Automation Driver - server-side protocol core
//!
//! Clients send JSON-over-HTTP commands ("create session", "find element",
//! "delete session") against paths like `/session/1/element`. This crate
//! routes those paths through a tree of virtual directories, keeps the
//! session and element registries, and runs finds against a live UI tree
//! through a narrow introspection trait.
//!
//! ```text
//! Request → Driver → /session (SessionRoot) → /{id} (Session)
//!                                                  ↓
//!                               /element(s) → ElementStore → Find Engine
//!                                                                ↓
//!                                                  UiThread → UiIntrospector
//! ```
//!
//! Transport (HTTP parsing, TLS) is someone else's job. So is knowing what
//! a widget is: that lives behind [`UiIntrospector`].

pub mod clock;
pub mod config;
pub mod element_store;
pub mod error;
pub mod events;
pub mod find;
pub mod introspect;
pub mod protocol;
pub mod server;
pub mod session;
pub mod session_root;
pub mod ui_thread;
pub mod vdir;

#[cfg(test)]
mod testing;

pub use clock::{Clock, TokioClock};
pub use config::DriverConfig;
pub use element_store::ElementStore;
pub use error::{DriverError, Result};
pub use events::{DriverEvent, EventBus};
pub use find::{FindContext, FindQuery};
pub use introspect::{CollaboratorError, Locator, UiIntrospector};
pub use protocol::{ElementId, ElementRef, Method, Reply, Request, Response, SessionId};
pub use server::Driver;
pub use session::Session;
pub use session_root::SessionRoot;
pub use ui_thread::UiThread;
pub use vdir::{Mounts, StaticDirectory, VirtualDirectory};
