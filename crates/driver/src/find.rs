//! Find Engine - bounded polling over the UI tree
//!
//! Policy:
//! - attempt 0 runs immediately
//! - while an attempt finds nothing and less than the implicit wait has
//!   elapsed, sleep one poll interval and try again
//! - the attempt that starts just before the deadline still runs to
//!   completion; nothing starts after it
//! - collaborator errors end the loop at once, no retry
//!
//! Each attempt is one job on the UI thread. Sleeping happens here, on the
//! async side, so the UI thread is free between attempts.

use std::time::Duration;

use crate::clock::Clock;
use crate::error::Result;
use crate::introspect::{CollaboratorError, Locator, UiIntrospector};
use crate::protocol::ElementId;
use crate::ui_thread::UiThread;

/// One find request. Single vs. multiple is chosen by the caller:
/// `find_element` caps the search at one match, `find_elements` does not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindQuery {
    pub locator: Locator,
    /// Element to search under; `None` means the default root
    pub root: Option<ElementId>,
}

impl FindQuery {
    pub fn new(locator: Locator) -> Self {
        Self {
            locator,
            root: None,
        }
    }

    pub fn under(mut self, root: ElementId) -> Self {
        self.root = Some(root);
        self
    }
}

/// Everything a find needs from its session
pub struct FindContext<'a, U> {
    pub ui: &'a UiThread<U>,
    pub clock: &'a dyn Clock,
    pub implicit_wait: Duration,
    pub poll_interval: Duration,
}

/// A matched UI object with its dedup key
pub struct Located<U: UiIntrospector> {
    pub handle: U::Handle,
    pub identity: U::Identity,
}

/// Poll until something matches or the implicit wait runs out
///
/// Returns the matches of the first non-empty attempt, in discovery order,
/// or an empty vec once the wait budget is spent.
pub async fn poll<U: UiIntrospector>(
    ctx: &FindContext<'_, U>,
    root: Option<U::Handle>,
    locator: &Locator,
    limit: Option<usize>,
) -> Result<Vec<Located<U>>> {
    let started = ctx.clock.now();
    let mut attempt: u32 = 0;

    loop {
        let root = root.clone();
        let query = locator.clone();
        let found = ctx
            .ui
            .run(move |ui| search(ui, root, &query, limit))
            .await?
            .map_err(|e| {
                tracing::warn!("Find {}={:?} failed: {}", locator.using, locator.value, e);
                e
            })?;

        let elapsed = ctx.clock.now().saturating_sub(started);
        tracing::debug!(
            attempt,
            matches = found.len(),
            ?elapsed,
            "find {}={:?}",
            locator.using,
            locator.value
        );

        if !found.is_empty() || elapsed >= ctx.implicit_wait {
            return Ok(found);
        }

        ctx.clock.sleep(ctx.poll_interval).await;
        attempt += 1;
    }
}

/// Collect descendants of `root` matching `locator`, depth-first, in order
///
/// Runs on the UI thread. `root` itself is never a candidate.
pub fn search<U: UiIntrospector>(
    ui: &U,
    root: Option<U::Handle>,
    locator: &Locator,
    limit: Option<usize>,
) -> std::result::Result<Vec<Located<U>>, CollaboratorError> {
    ui.validate_locator(locator)?;

    let root = root.unwrap_or_else(|| ui.default_root());
    let mut found = Vec::new();

    // Reverse so children pop left-to-right
    let mut stack = ui.list_children(&root)?;
    stack.reverse();

    while let Some(handle) = stack.pop() {
        if ui.matches_locator(&handle, locator)? {
            found.push(Located {
                identity: ui.stable_identity_of(&handle),
                handle: handle.clone(),
            });
            if limit.is_some_and(|max| found.len() >= max) {
                break;
            }
        }

        let children = ui.list_children(&handle)?;
        stack.extend(children.into_iter().rev());
    }

    Ok(found)
}
