//! # Readiness gate between widget spawn and the first script callback.
//!
//! Closed when spawning begins, opened by the host once the rendering surface
//! has finished loading its page. The update receiver waits on it before
//! running any callback, so no update reaches script too early.

use std::sync::Arc;

use tokio::sync::watch;

/// Open/closed gate with async waiting.
#[derive(Clone, Debug)]
pub struct ReadinessGate {
    tx: Arc<watch::Sender<bool>>,
}

impl ReadinessGate {
    /// Creates a closed gate.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Lets callbacks through (page load finished).
    pub fn open(&self) {
        self.tx.send_replace(true);
    }

    /// Holds callbacks back.
    pub fn close(&self) {
        self.tx.send_replace(false);
    }

    pub fn is_open(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once the gate is open.
    pub async fn wait_open(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|open| *open).await;
    }

    /// Resolves once the gate is closed.
    pub(crate) async fn wait_closed(&self) {
        let mut rx = self.tx.subscribe();
        let _ = rx.wait_for(|open| !*open).await;
    }
}

impl Default for ReadinessGate {
    fn default() -> Self {
        Self::new()
    }
}
