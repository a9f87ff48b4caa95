//! # Widget module contract.
//!
//! A widget module is what the loader resolves by name. It provides:
//! - the mandatory worker entry point [`WidgetModule::run`],
//! - an optional logical type ([`WidgetModule::widget_type`]),
//! - an optional table of native functions exposed to script.
//!
//! The common handle type is [`ModuleRef`], an `Arc<dyn WidgetModule>` shared
//! between the registry and every worker spawned from it.

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::WidgetHandle;
use crate::error::WorkerError;
use crate::script::NativeFunction;

/// # Loadable widget module.
///
/// `run` is the worker body. It should poll [`WidgetHandle::is_stopping`] (or
/// await [`WidgetHandle::stopped`]) and return promptly once the stop
/// notification fires; a worker that does not is aborted after the exit budget.
/// Each worker has a thread of its own, so blocking calls are allowed; a worker
/// blocked at the deadline is detached instead of joined.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use widgetvisor::{WidgetHandle, WidgetModule, WorkerError};
///
/// struct Clock;
///
/// #[async_trait]
/// impl WidgetModule for Clock {
///     async fn run(&self, handle: WidgetHandle) -> Result<(), WorkerError> {
///         while !handle.is_stopping() {
///             handle.update(vec!["12:00".into()]).await?;
///             tokio::select! {
///                 _ = handle.stopped() => break,
///                 _ = tokio::time::sleep(std::time::Duration::from_secs(60)) => {}
///             }
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait WidgetModule: Send + Sync + 'static {
    /// Worker entry point; runs until the stop notification or until it is done.
    async fn run(&self, handle: WidgetHandle) -> Result<(), WorkerError>;

    /// Logical widget type; the widget name is used when `None`.
    fn widget_type(&self) -> Option<String> {
        None
    }

    /// Functions exposed to script as methods of the widget object.
    fn native_functions(&self) -> Vec<NativeFunction> {
        Vec::new()
    }
}

/// Shared reference to a module.
pub type ModuleRef = Arc<dyn WidgetModule>;
