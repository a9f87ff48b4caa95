//! # Run one widget worker to completion on its own thread.
//!
//! [`WorkerThread::spawn`] starts a dedicated OS thread per widget. The thread
//! drives [`run_worker`] with `Handle::block_on`, so a module that blocks its
//! thread (device polling, socket reads) never starves the runtime or the
//! shutdown coordinator.
//!
//! ## Event flow
//!
//! ```text
//! Success:       module.run() → Ok(())           → publish WorkerStopped
//! Cancellation:  module.run() → Err(Canceled)    → publish WorkerStopped
//! Forced:        cancel token fires first        → publish WorkerStopped
//! Failure:       module.run() → Err(Fail)        → publish WorkerFailed
//! Panic:         module.run() panics             → publish WorkerFailed
//!                                   │
//!                                   ▼
//!                       exit.confirm()   (blocks while the coordinator holds the lock)
//! ```
//!
//! ## Rules
//! - Always publishes **exactly one** terminal event.
//! - `Canceled` is a graceful exit, not a failure.
//! - A panicking module still confirms its exit, so shutdown joins it without waiting.
//! - Forced cancellation drops the module future at its next `.await`; a thread
//!   stuck in blocking code is detached and left to finish on its own.

use std::io;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::thread;

use futures::FutureExt;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::core::exit::ExitSignal;
use crate::core::handle::WidgetHandle;
use crate::error::WorkerError;
use crate::events::{Bus, Event, EventKind};
use crate::module::ModuleRef;

/// Dedicated OS thread running one widget's worker.
#[derive(Debug)]
pub(crate) struct WorkerThread {
    thread: thread::JoinHandle<()>,
    cancel: CancellationToken,
}

impl WorkerThread {
    /// Starts the worker thread for the widget behind `handle`.
    ///
    /// Fails only if the OS refuses to create the thread.
    ///
    /// On a current-thread runtime the module's timers and IO only make
    /// progress while the runtime's own thread is inside `Runtime::block_on`.
    pub(crate) fn spawn(
        runtime: Handle,
        module: ModuleRef,
        handle: WidgetHandle,
        exit: Arc<ExitSignal>,
        bus: Bus,
    ) -> io::Result<Self> {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let thread = thread::Builder::new()
            .name(thread_name(handle.name()))
            .spawn(move || runtime.block_on(run_worker(module, handle, exit, bus, token)))?;
        Ok(Self { thread, cancel })
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Waits for the thread to end without blocking the calling task.
    pub(crate) async fn join(self) -> Result<(), String> {
        let thread = self.thread;
        match tokio::task::spawn_blocking(move || thread.join()).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(panic)) => Err(crate::subscribers::panic_message(&*panic)),
            Err(e) => Err(e.to_string()),
        }
    }

    /// Cancels the module future and detaches the thread.
    pub(crate) fn abort(self) {
        self.cancel.cancel();
    }
}

/// Thread name for a widget; interior NULs are not allowed by the OS.
fn thread_name(widget: &str) -> String {
    format!("widget-{}", widget.replace('\0', ""))
}

/// Runs `module` for the widget behind `handle` and confirms its exit on `exit`.
///
/// `cancel` ends the module early; it is the coordinator's forced cancellation.
pub(crate) async fn run_worker(
    module: ModuleRef,
    handle: WidgetHandle,
    exit: Arc<ExitSignal>,
    bus: Bus,
    cancel: CancellationToken,
) {
    let name: Arc<str> = Arc::from(handle.name());

    let res = tokio::select! {
        res = AssertUnwindSafe(module.run(handle)).catch_unwind() => res,
        _ = cancel.cancelled() => {
            tracing::debug!(widget = %name, "widget worker cancelled");
            Ok(Err(WorkerError::Canceled))
        }
    };
    match res {
        Ok(Ok(())) | Ok(Err(WorkerError::Canceled)) => publish_stopped(&bus, &name),
        Ok(Err(e)) => {
            tracing::warn!(widget = %name, error = %e, "widget worker failed");
            publish_failed(&bus, &name, e.to_string());
        }
        Err(panic) => {
            let info = crate::subscribers::panic_message(&*panic);
            tracing::error!(widget = %name, panic = %info, "widget worker panicked");
            publish_failed(&bus, &name, format!("panicked: {info}"));
        }
    }

    exit.confirm().await;
}

/// Publishes `WorkerStopped` (success or graceful cancellation).
fn publish_stopped(bus: &Bus, name: &Arc<str>) {
    bus.publish(Event::new(EventKind::WorkerStopped).with_widget(Arc::clone(name)));
}

/// Publishes `WorkerFailed` with error details.
fn publish_failed(bus: &Bus, name: &Arc<str>, reason: String) {
    bus.publish(
        Event::new(EventKind::WorkerFailed)
            .with_widget(Arc::clone(name))
            .with_reason(reason),
    );
}
