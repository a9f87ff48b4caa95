//! Error types used by the widget runtime, the scripting seam and widget workers.
//!
//! This module defines the main error enums:
//!
//! - [`WidgetError`]: per-widget failures raised by the runtime itself
//!   (loading, starting, shutting down, delivering updates).
//! - [`WorkerError`]: returned by a module's worker entry point.
//! - [`UpdateError`]: returned to a worker when an update could not be handed to script.
//! - [`ScriptError`]: raised by [`ScriptContext`](crate::ScriptContext) implementations.
//! - [`ConfigError`]: raised while extracting the widget list from a bar configuration.
//!
//! None of these terminate the host: every failure is isolated to the widget it names.
//! Runtime errors provide `as_label` for stable snake_case log/event labels.

use std::time::Duration;
use thiserror::Error;

/// # Per-widget failures produced by the runtime.
///
/// Every variant is non-fatal for the bar: the affected widget is skipped,
/// cancelled or left without its update, and the remaining widgets carry on.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WidgetError {
    /// The module could not be resolved, or it lacks its mandatory entry point.
    #[error("loading of module '{module}' failed: {reason}")]
    ModuleLoad {
        /// Requested module name.
        module: String,
        /// What went wrong.
        reason: String,
    },

    /// The worker could not be started (no runtime, bridge failure).
    #[error("failed to start widget {widget}: {reason}")]
    WorkerStart {
        /// Widget name.
        widget: String,
        /// What went wrong.
        reason: String,
    },

    /// The worker did not confirm its exit within the grace budget and was aborted.
    #[error("timed out after {grace:?} waiting for widget {widget} to exit")]
    ShutdownTimeout {
        /// Widget name.
        widget: String,
        /// The exit budget that was exceeded.
        grace: Duration,
    },

    /// An update reached the callback without a usable script object.
    #[error("missing script context or object for widget {widget}")]
    BridgeMissingContext {
        /// Widget name.
        widget: String,
    },
}

impl WidgetError {
    /// Returns a short stable label (snake_case) for use in logs/events.
    ///
    /// # Example
    /// ```
    /// use widgetvisor::WidgetError;
    ///
    /// let err = WidgetError::ModuleLoad { module: "volume".into(), reason: "not registered".into() };
    /// assert_eq!(err.as_label(), "module_load_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            WidgetError::ModuleLoad { .. } => "module_load_failed",
            WidgetError::WorkerStart { .. } => "worker_start_failed",
            WidgetError::ShutdownTimeout { .. } => "shutdown_timeout",
            WidgetError::BridgeMissingContext { .. } => "bridge_missing_context",
        }
    }

    /// Name of the widget or module the error is about.
    pub fn subject(&self) -> &str {
        match self {
            WidgetError::ModuleLoad { module, .. } => module,
            WidgetError::WorkerStart { widget, .. }
            | WidgetError::ShutdownTimeout { widget, .. }
            | WidgetError::BridgeMissingContext { widget } => widget,
        }
    }
}

/// # Errors returned by a widget's worker entry point.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum WorkerError {
    /// The worker gave up.
    #[error("worker failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The worker observed the stop notification and left early.
    #[error("worker cancelled")]
    Canceled,
}

impl WorkerError {
    /// Returns a short stable label (snake_case) for use in logs/events.
    pub fn as_label(&self) -> &'static str {
        match self {
            WorkerError::Fail { .. } => "worker_failed",
            WorkerError::Canceled => "worker_canceled",
        }
    }
}

impl From<UpdateError> for WorkerError {
    fn from(e: UpdateError) -> Self {
        match e {
            UpdateError::Stopped => WorkerError::Canceled,
            other => WorkerError::Fail {
                error: other.to_string(),
            },
        }
    }
}

/// # Errors returned to a worker by [`WidgetHandle::update`](crate::WidgetHandle::update).
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateError {
    /// The update queue receiver is gone (scripting environment torn down).
    #[error("update queue closed")]
    Closed,

    /// The update was dropped without being consumed (no script object).
    #[error("update rejected by the scripting side")]
    Rejected,

    /// The stop notification fired while waiting for the update to be consumed.
    #[error("stop requested while waiting for update")]
    Stopped,
}

/// # Errors raised by a scripting environment.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScriptError {
    /// The referenced object does not exist in this environment.
    #[error("unknown script object #{0}")]
    UnknownObject(u64),

    /// A script-side exception.
    #[error("script exception: {0}")]
    Exception(String),
}

/// # Errors raised while reading the widget list of a bar configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// `"widgets"` exists but is not an array.
    #[error("\"widgets\" must be an array")]
    NotAnArray,

    /// An entry could not be decoded into a [`WidgetSpec`](crate::WidgetSpec).
    #[error("invalid widget entry #{index}: {source}")]
    InvalidEntry {
        /// Position in the array.
        index: usize,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },
}
