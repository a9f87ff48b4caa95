//! # Runtime events emitted by the lifecycle manager and widget workers.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Spawn events**: module resolution and worker start (spawned, load failed, start failed)
//! - **Worker events**: a worker's own outcome (stopped, failed)
//! - **Shutdown events**: the coordinator's protocol (requested, joined, timed out, completed)
//!
//! The [`Event`] struct carries additional metadata such as timestamps, widget and
//! module names, reasons and the exit budget.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use widgetvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::ModuleLoadFailed)
//!     .with_module("does_not_exist")
//!     .with_reason("module is not registered");
//!
//! assert_eq!(ev.kind, EventKind::ModuleLoadFailed);
//! assert_eq!(ev.module.as_deref(), Some("does_not_exist"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `widget`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `widget`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Spawn events ===
    /// Worker started for a widget.
    ///
    /// Sets:
    /// - `widget`: widget name
    /// - `module`: module name
    WidgetSpawned,

    /// Module missing or lacking its worker entry point; slot left empty.
    ///
    /// Sets:
    /// - `widget`: widget name the slot would have had
    /// - `module`: requested module name
    /// - `reason`: loader message
    ModuleLoadFailed,

    /// Worker could not be started (bridge failure, no runtime); slot left empty.
    ///
    /// Sets:
    /// - `widget`: widget name
    /// - `module`: module name
    /// - `reason`: failure message
    WorkerStartFailed,

    // === Worker events ===
    /// Worker entry point returned (normally or after observing stop).
    ///
    /// Sets:
    /// - `widget`: widget name
    WorkerStopped,

    /// Worker entry point returned an error.
    ///
    /// Sets:
    /// - `widget`: widget name
    /// - `reason`: error message
    WorkerFailed,

    // === Shutdown events ===
    /// The stop notification was broadcast.
    ShutdownRequested,

    /// Worker confirmed its exit and was joined.
    ///
    /// Sets:
    /// - `widget`: widget name
    WidgetJoined,

    /// Worker did not confirm its exit in time and was aborted.
    ///
    /// Sets:
    /// - `widget`: widget name
    /// - `grace_ms`: exit budget (ms)
    ExitTimedOut,

    /// Every slot was handled and the stop notification was reset.
    ShutdownCompleted,

    // === Surface events ===
    /// The readiness gate opened; script callbacks may now run.
    SurfaceReady,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the widget, if applicable.
    pub widget: Option<Arc<str>>,
    /// Name of the module, if applicable.
    pub module: Option<Arc<str>>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Exit budget in milliseconds (compact).
    pub grace_ms: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            widget: None,
            module: None,
            reason: None,
            grace_ms: None,
        }
    }

    /// Attaches a widget name.
    #[inline]
    pub fn with_widget(mut self, widget: impl Into<Arc<str>>) -> Self {
        self.widget = Some(widget.into());
        self
    }

    /// Attaches a module name.
    #[inline]
    pub fn with_module(mut self, module: impl Into<Arc<str>>) -> Self {
        self.module = Some(module.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches the exit budget (stored as milliseconds).
    #[inline]
    pub fn with_grace(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.grace_ms = Some(ms);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_widget(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_widget(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_is_monotonic() {
        let a = Event::new(EventKind::ShutdownRequested);
        let b = Event::new(EventKind::ShutdownCompleted);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn grace_is_stored_in_millis() {
        let ev = Event::new(EventKind::ExitTimedOut)
            .with_widget("mpd")
            .with_grace(Duration::from_secs(2));
        assert_eq!(ev.grace_ms, Some(2000));
        assert_eq!(ev.widget.as_deref(), Some("mpd"));
    }
}
