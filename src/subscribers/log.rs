//! # LogWriter: lifecycle journal rendered through `tracing`
//!
//! A subscriber that turns every incoming [`Event`] into one log line under the
//! `widgetvisor::events` target. Diagnostics raised at the call sites (load
//! failures, start failures, forced exits) use the crate's own targets, so a
//! host can filter the journal independently:
//!
//! ```text
//! INFO widgetvisor::events: widget spawned        seq=3 widget="volume" module="volume"
//! INFO widgetvisor::events: module load failed    seq=4 module="does_not_exist" reason="module is not registered"
//! INFO widgetvisor::events: widget exit timed out seq=9 widget="mpd" grace_ms=Some(2000)
//! INFO widgetvisor::events: widget joined         seq=10 widget="volume"
//! ```

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;
use async_trait::async_trait;

const JOURNAL: &str = "widgetvisor::events";

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let widget = e.widget.as_deref().unwrap_or("-");
        let module = e.module.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("");

        match e.kind {
            EventKind::WidgetSpawned => {
                tracing::info!(target: JOURNAL, seq = e.seq, widget, module, "widget spawned");
            }
            EventKind::ModuleLoadFailed => {
                tracing::info!(target: JOURNAL, seq = e.seq, module, reason, "module load failed");
            }
            EventKind::WorkerStartFailed => {
                tracing::info!(target: JOURNAL, seq = e.seq, widget, module, reason, "worker start failed");
            }
            EventKind::WorkerStopped => {
                tracing::info!(target: JOURNAL, seq = e.seq, widget, "worker stopped");
            }
            EventKind::WorkerFailed => {
                tracing::info!(target: JOURNAL, seq = e.seq, widget, reason, "worker failed");
            }
            EventKind::ShutdownRequested => {
                tracing::info!(target: JOURNAL, seq = e.seq, "gracefully shutting down widget workers");
            }
            EventKind::WidgetJoined => {
                tracing::info!(target: JOURNAL, seq = e.seq, widget, "widget joined");
            }
            EventKind::ExitTimedOut => {
                tracing::info!(target: JOURNAL, seq = e.seq, widget, grace_ms = ?e.grace_ms, "widget exit timed out");
            }
            EventKind::ShutdownCompleted => {
                tracing::info!(target: JOURNAL, seq = e.seq, "widget shutdown completed");
            }
            EventKind::SurfaceReady => {
                tracing::info!(target: JOURNAL, seq = e.seq, "rendering surface ready");
            }
            EventKind::SubscriberOverflow => {
                tracing::info!(target: JOURNAL, seq = e.seq, subscriber = widget, reason, "subscriber overflow");
            }
            EventKind::SubscriberPanicked => {
                tracing::info!(target: JOURNAL, seq = e.seq, subscriber = widget, reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
