//! # widgetvisor
//!
//! **Widgetvisor** is the widget execution core of a status-bar host.
//!
//! It loads widget modules by name, gives each one an object in the embedded
//! scripting environment, runs every widget's worker on its own thread,
//! delivers worker updates to the widget's `onDataChanged` handler on the
//! scripting thread, and shuts everything down with a bounded per-widget wait.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  WidgetSpec  │   │  WidgetSpec  │   │  WidgetSpec  │
//!     │   (volume)   │   │   (clock)    │   │    (mpd)     │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  LifecycleManager                                                 │
//! │  - ModuleRegistry (name → WidgetModule, optional shared libs)     │
//! │  - Bus + SubscriberSet (lifecycle events)                         │
//! │  - StopSignal, ReadinessGate, update queue (session objects)      │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │    worker    │   │    worker    │   │    worker    │
//!     │ module.run() │   │ module.run() │   │ module.run() │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            │ WidgetHandle::update(values)        │
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │        update queue (FIFO) ── ReadinessGate ── UpdateReceiver     │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼  scripting thread
//!                 deliver_update(ctx, update) → widget_<type>.onDataChanged(...)
//! ```
//!
//! ### Shutdown
//! ```text
//! shutdown_all(registry):
//!   ├─► hold every widget's exit lock
//!   ├─► publish ShutdownRequested, broadcast stop
//!   ├─► per widget: wait ≤ exit_grace for its exit confirmation
//!   │       ├─ confirmed ─► join          ─► WidgetJoined
//!   │       └─ timed out ─► abort()       ─► ExitTimedOut (thread detached)
//!   └─► reset stop, close gate, publish ShutdownCompleted
//! ```
//!
//! ## Features
//! | Area              | Description                                                      | Key types / traits                          |
//! |-------------------|------------------------------------------------------------------|---------------------------------------------|
//! | **Lifecycle**     | Spawn widgets in order, shut them down with a bounded wait.      | [`LifecycleManager`], [`Registry`]          |
//! | **Modules**       | Define widgets as trait objects or closures, resolve by name.    | [`WidgetModule`], [`WidgetFn`], [`ModuleRegistry`] |
//! | **Scripting**     | The environment seam, widget objects and update delivery.        | [`ScriptContext`], [`ScriptValue`], [`deliver_update`] |
//! | **Subscriber API**| Hook into lifecycle events.                                      | [`Subscribe`], [`Event`]                    |
//! | **Errors**        | Typed, per-widget, never fatal for the bar.                      | [`WidgetError`], [`WorkerError`], [`UpdateError`] |
//! | **Configuration** | Runtime settings and the widget list.                            | [`ManagerConfig`], [`WidgetSpec`]           |
//!
//! ## Optional features
//! - `logging`: exports the [`LogWriter`] subscriber, a `tracing` journal of lifecycle events.
//! - `dylib`: loads `libwidget_<name>` shared modules from [`ManagerConfig::module_dir`].
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use widgetvisor::{
//!     LifecycleManager, ManagerConfig, ModuleRegistry, ScriptValue, WidgetFn, WidgetHandle,
//!     WidgetSpec, WorkerError,
//! };
//!
//! async fn session<C: widgetvisor::ScriptContext>(ctx: &mut C) -> Result<(), Box<dyn std::error::Error>> {
//!     let clock = WidgetFn::new(|handle: WidgetHandle| async move {
//!         while !handle.is_stopping() {
//!             handle.update(vec![ScriptValue::from("12:00")]).await?;
//!             tokio::select! {
//!                 _ = handle.stopped() => break,
//!                 _ = tokio::time::sleep(std::time::Duration::from_secs(1)) => {}
//!             }
//!         }
//!         Ok::<_, WorkerError>(())
//!     })
//!     .with_type("time");
//!
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn widgetvisor::Subscribe>> = vec![Arc::new(widgetvisor::LogWriter::new())];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn widgetvisor::Subscribe>> = Vec::new();
//!
//!     let mut manager = LifecycleManager::builder(ManagerConfig::default())
//!         .with_modules(ModuleRegistry::new().with_module("clock", clock))
//!         .with_subscribers(subs)
//!         .build();
//!     let mut updates = manager.take_update_receiver().ok_or("receiver already taken")?;
//!
//!     let bar = serde_json::json!({ "widgets": [{ "module": "clock" }] });
//!     let registry = manager.spawn_all(WidgetSpec::list_from_bar_config(&bar)?, ctx);
//!
//!     // The page finished loading.
//!     manager.surface_ready();
//!     updates.drain(ctx);
//!
//!     let report = manager.shutdown_all(registry).await;
//!     assert!(report.is_clean());
//!     manager.close().await;
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod module;
mod script;
mod subscribers;

#[cfg(test)]
mod testing;

// ---- Public re-exports ----

pub use crate::core::{
    LifecycleManager, ManagerBuilder, PendingUpdate, ReadinessGate, Registry, ShutdownReport,
    StopSignal, UpdateReceiver, UpdateSender, UpdateTarget, Widget, WidgetHandle, update_channel,
};
pub use config::{ManagerConfig, WidgetSpec};
pub use error::{ConfigError, ScriptError, UpdateError, WidgetError, WorkerError};
pub use events::{Bus, Event, EventKind};
pub use module::{LoadedModule, ModuleRef, ModuleRegistry, WidgetFn, WidgetModule};
pub use script::{
    DATA_CHANGED_HANDLER, Delivery, MAX_CLASS_NAME_LEN, NativeFn, NativeFunction, ObjectHandle,
    ScriptContext, ScriptValue, ValueKind, class_name, deliver_update, install_widget_object,
    marshal,
};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: load widget modules from shared libraries.
// Enable with: `--features dylib`
#[cfg(feature = "dylib")]
pub use module::DylibLoader;

// Optional: expose a built-in `tracing` journal subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
