//! # Exit handshake between a worker and the shutdown coordinator.
//!
//! ```text
//! coordinator                         worker
//!   hold()  ── lock taken ──┐
//!   stop.broadcast()        │         ...observes stop, cleans up...
//!   wait_until(deadline)    │         confirm() ── blocks on the lock
//!     enable notified       │
//!     release lock ─────────┘──────►  exited = true, notify
//!     ◄──────────────────────────────────────────────┘
//! ```
//!
//! The coordinator takes every worker's lock **before** the stop broadcast, so
//! no worker can complete its handshake before the coordinator is listening.

use std::sync::Arc;

use tokio::sync::{Mutex, Notify, OwnedMutexGuard};
use tokio::time::{self, Instant};

/// Per-widget exit flag plus the notifier the coordinator waits on.
#[derive(Debug, Default)]
pub(crate) struct ExitSignal {
    exited: Arc<Mutex<bool>>,
    notify: Notify,
}

impl ExitSignal {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Worker side: records the exit and wakes the coordinator.
    ///
    /// Blocks while the coordinator holds the lock.
    pub(crate) async fn confirm(&self) {
        let mut exited = self.exited.lock().await;
        *exited = true;
        self.notify.notify_one();
    }

    /// Coordinator side: takes the lock and keeps it until [`ExitGuard::wait_until`].
    pub(crate) async fn hold(self: &Arc<Self>) -> ExitGuard {
        ExitGuard {
            guard: Arc::clone(&self.exited).lock_owned().await,
            signal: Arc::clone(self),
        }
    }
}

/// Held exit lock of one worker.
pub(crate) struct ExitGuard {
    guard: OwnedMutexGuard<bool>,
    signal: Arc<ExitSignal>,
}

impl ExitGuard {
    /// Releases the lock and waits for the worker's confirmation until `deadline`.
    ///
    /// Returns `true` if the worker confirmed its exit.
    pub(crate) async fn wait_until(self, deadline: Instant) -> bool {
        let ExitGuard { guard, signal } = self;
        if *guard {
            return true;
        }

        let notified = signal.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();
        drop(guard);

        if time::timeout_at(deadline, notified).await.is_ok() {
            return true;
        }
        // Lets a confirm() already in progress at the deadline finish.
        *signal.exited.lock().await
    }
}
