//! # Shutdown coordinator: stop every worker, join or abort each one.
//!
//! ## Sequence
//! ```text
//! 1. hold()   every Some(widget)'s exit lock, in slot order
//! 2. publish ShutdownRequested, stop.broadcast()
//! 3. for each widget, in slot order:
//!        wait_until(now + grace)
//!          ├─ confirmed → join (unbounded)        → publish WidgetJoined
//!          └─ timed out → WARN, abort() the worker → publish ExitTimedOut
//! 4. stop.reset(), publish ShutdownCompleted
//! ```
//!
//! ## Rules
//! - Locks are taken **before** the broadcast, so no exit confirmation can be missed.
//! - The budget is per widget and sequential: worst case is `grace × widgets`.
//! - `abort()` never blocks: the module future is dropped at its next `.await`,
//!   and a thread stuck in blocking code is detached.
//! - Empty slots are counted as skipped and never waited on.

use std::time::Duration;

use tokio::time::Instant;

use crate::core::registry::Widget;
use crate::core::stop::StopSignal;
use crate::error::WidgetError;
use crate::events::{Bus, Event, EventKind};

/// What happened to each widget during one shutdown.
#[derive(Debug, Default, PartialEq)]
pub struct ShutdownReport {
    /// Widgets that confirmed their exit and were joined, in slot order.
    pub joined: Vec<String>,
    /// Widgets aborted after exceeding the exit budget.
    pub forced: Vec<WidgetError>,
    /// Slots that held no widget.
    pub skipped: usize,
}

impl ShutdownReport {
    /// Returns `true` if every spawned widget exited on its own.
    pub fn is_clean(&self) -> bool {
        self.forced.is_empty()
    }

    /// Names of the aborted widgets.
    pub fn forced_names(&self) -> Vec<&str> {
        self.forced.iter().map(WidgetError::subject).collect()
    }
}

/// Stops and collects every widget in `slots`.
pub(crate) async fn coordinate(
    slots: Vec<Option<Widget>>,
    stop: &StopSignal,
    bus: &Bus,
    grace: Duration,
) -> ShutdownReport {
    let mut report = ShutdownReport::default();

    let mut held = Vec::with_capacity(slots.len());
    for slot in slots {
        match slot {
            Some(widget) => {
                let guard = widget.exit.hold().await;
                held.push((widget, guard));
            }
            None => report.skipped += 1,
        }
    }

    bus.publish(Event::new(EventKind::ShutdownRequested).with_grace(grace));
    stop.broadcast();

    for (widget, guard) in held {
        let deadline = Instant::now() + grace;
        if guard.wait_until(deadline).await {
            if let Err(e) = widget.worker.join().await {
                tracing::error!(widget = %widget.name, error = %e, "failed to join widget worker");
            }
            bus.publish(Event::new(EventKind::WidgetJoined).with_widget(widget.name.clone()));
            report.joined.push(widget.name.to_string());
        } else {
            tracing::warn!(
                widget = %widget.name,
                grace_ms = grace.as_millis() as u64,
                "widget did not exit in time, cancelling its worker"
            );
            widget.worker.abort();
            bus.publish(
                Event::new(EventKind::ExitTimedOut)
                    .with_widget(widget.name.clone())
                    .with_grace(grace),
            );
            report.forced.push(WidgetError::ShutdownTimeout {
                widget: widget.name.to_string(),
                grace,
            });
        }
    }

    stop.reset();
    bus.publish(Event::new(EventKind::ShutdownCompleted));
    report
}
