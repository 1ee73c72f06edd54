//! UI Thread - single owner of the live UI object graph
//!
//! UI objects can't be read while the UI mutates them, so the introspector
//! lives on one dedicated thread and everything else sends it closures.
//! Message passing, no locks: each job carries a oneshot for its result.

use tokio::sync::{mpsc, oneshot};

use crate::error::{DriverError, Result};

type Job<U> = Box<dyn FnOnce(&mut U) + Send>;

/// Handle to the UI-owning thread. Cheap to clone.
///
/// The thread exits once every handle has been dropped.
pub struct UiThread<U> {
    tx: mpsc::UnboundedSender<Job<U>>,
}

impl<U> Clone for UiThread<U> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<U: Send + 'static> UiThread<U> {
    /// Move `ui` onto a fresh thread
    pub fn spawn(ui: U) -> Result<Self> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Job<U>>();

        std::thread::Builder::new()
            .name("ui-thread".to_string())
            .spawn(move || {
                let mut ui = ui;
                while let Some(job) = rx.blocking_recv() {
                    job(&mut ui);
                }
                tracing::debug!("UI thread exiting");
            })?;

        Ok(Self { tx })
    }

    /// Run `f` on the UI thread and wait for its result
    pub async fn run<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut U) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.tx
            .send(Box::new(move |ui| {
                let _ = reply_tx.send(f(ui)); // Caller may have given up
            }))
            .map_err(|_| DriverError::UiThreadGone)?;

        reply_rx.await.map_err(|_| DriverError::UiThreadGone)
    }
}
