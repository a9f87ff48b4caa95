//! # LifecycleManager: spawns the configured widgets and shuts them down.
//!
//! The [`LifecycleManager`] owns the event bus, the [`SubscriberSet`], the
//! module registry and the three session-wide coordination objects: the
//! [`StopSignal`], the [`ReadinessGate`] and the update queue.
//!
//! ## High-level architecture
//! ```text
//! spawn_all(specs, ctx):
//!   gate.close()
//!   WidgetSpec[0]  WidgetSpec[1]  ...  WidgetSpec[N-1]
//!       │              │                    │
//!       └──► ModuleRegistry::load(module)          ── miss  ──► WARN, ModuleLoadFailed, slot None
//!            install_widget_object(ctx, type, natives) ─ fail ──► ERROR, WorkerStartFailed, slot None
//!            WorkerThread::spawn(module, WidgetHandle) ── fail ──► ERROR, WorkerStartFailed, slot None
//!                                                      ──► WidgetSpawned, slot Some
//!
//! Host (page loaded):
//!   surface_ready() ──► gate.open() ──► UpdateReceiver starts delivering
//!
//! shutdown_all(registry):
//!   nothing spawned ──► DEBUG, empty report
//!   otherwise       ──► shutdown::coordinate(...) ──► gate.close()
//!
//! Event flow:
//!   spawn_all / run_worker / coordinate ── publish ──► Bus ──► listener ──► SubscriberSet::emit
//! ```
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use widgetvisor::{LifecycleManager, ManagerConfig, ModuleRegistry, WidgetFn, WidgetHandle, WorkerError};
//!
//! # async fn demo<C: widgetvisor::ScriptContext>(ctx: &mut C) {
//! let modules = ModuleRegistry::new().with_module(
//!     "clock",
//!     WidgetFn::new(|handle: WidgetHandle| async move {
//!         handle.stopped().await;
//!         Ok::<_, WorkerError>(())
//!     }),
//! );
//!
//! let mut cfg = ManagerConfig::default();
//! cfg.exit_grace = Duration::from_millis(500);
//!
//! let mut manager = LifecycleManager::builder(cfg).with_modules(modules).build();
//! let updates = manager.take_update_receiver();
//!
//! let specs = vec![widgetvisor::WidgetSpec::new("clock", serde_json::json!({}))];
//! let registry = manager.spawn_all(specs, ctx);
//! manager.surface_ready();
//!
//! // ... the scripting thread drives `updates` ...
//! # drop(updates);
//!
//! let report = manager.shutdown_all(registry).await;
//! assert!(report.is_clean());
//! manager.close().await;
//! # }
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::{ManagerConfig, WidgetSpec};
use crate::core::exit::ExitSignal;
use crate::core::gate::ReadinessGate;
use crate::core::handle::WidgetHandle;
use crate::core::queue::{UpdateReceiver, UpdateSender, UpdateTarget, update_channel};
use crate::core::registry::{Registry, Widget};
use crate::core::runner::WorkerThread;
use crate::core::shutdown::{self, ShutdownReport};
use crate::core::stop::StopSignal;
use crate::error::WidgetError;
use crate::events::{Bus, Event, EventKind};
use crate::module::ModuleRegistry;
use crate::script::{ScriptContext, install_widget_object};
use crate::subscribers::SubscriberSet;

/// Forwarding task from the bus to the subscriber set.
struct Listener {
    join: JoinHandle<()>,
    done: CancellationToken,
}

/// Owns the widgets of a bar session from spawn to shutdown.
pub struct LifecycleManager {
    cfg: ManagerConfig,
    modules: ModuleRegistry,
    bus: Bus,
    subs: Arc<SubscriberSet>,
    listener: Option<Listener>,
    stop: StopSignal,
    gate: ReadinessGate,
    updates: UpdateSender,
    receiver: Option<UpdateReceiver>,
    runtime: Option<Handle>,
}

impl LifecycleManager {
    pub(crate) fn new_internal(
        cfg: ManagerConfig,
        modules: ModuleRegistry,
        bus: Bus,
        subs: SubscriberSet,
        runtime: Option<Handle>,
    ) -> Self {
        let gate = ReadinessGate::new();
        let (updates, receiver) = update_channel(gate.clone());
        let subs = Arc::new(subs);

        let listener = match &runtime {
            Some(rt) if !subs.is_empty() => Some(Self::subscriber_listener(&bus, &subs, rt)),
            _ => None,
        };

        Self {
            cfg,
            modules,
            bus,
            subs,
            listener,
            stop: StopSignal::new(),
            gate,
            updates,
            receiver: Some(receiver),
            runtime,
        }
    }

    /// Subscribes to the bus and forwards events to the subscriber set.
    ///
    /// On `done`, forwards whatever is still buffered and exits.
    fn subscriber_listener(bus: &Bus, subs: &Arc<SubscriberSet>, runtime: &Handle) -> Listener {
        let mut rx = bus.subscribe();
        let set = Arc::clone(subs);
        let done = CancellationToken::new();
        let stop = done.clone();

        let join = runtime.spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    ev = rx.recv() => match ev {
                        Ok(ev) => set.emit(&ev),
                        Err(RecvError::Lagged(_)) => continue,
                        Err(RecvError::Closed) => break,
                    },
                    _ = stop.cancelled() => {
                        while let Ok(ev) = rx.try_recv() {
                            set.emit(&ev);
                        }
                        break;
                    }
                }
            }
        });
        Listener { join, done }
    }

    /// The manager's configuration.
    pub fn config(&self) -> &ManagerConfig {
        &self.cfg
    }

    /// Event bus shared with every worker.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Session stop notification.
    pub fn stop_signal(&self) -> &StopSignal {
        &self.stop
    }

    /// Readiness gate in front of script callbacks.
    pub fn gate(&self) -> &ReadinessGate {
        &self.gate
    }

    /// Takes the consumer side of the update queue; `None` after the first call.
    ///
    /// Hand it to the thread owning the scripting environment.
    pub fn take_update_receiver(&mut self) -> Option<UpdateReceiver> {
        self.receiver.take()
    }

    /// Marks the rendering surface as loaded: script callbacks may run from now on.
    pub fn surface_ready(&self) {
        self.gate.open();
        self.bus.publish(Event::new(EventKind::SurfaceReady));
    }

    /// Spawns one worker per spec, in order.
    ///
    /// Returns a registry with exactly one slot per spec; failed widgets leave
    /// their slot empty and never stop the remaining ones from spawning.
    /// Must run on the thread owning `ctx`.
    pub fn spawn_all<C: ScriptContext>(&self, specs: Vec<WidgetSpec>, ctx: &mut C) -> Registry {
        self.gate.close();
        tracing::debug!(count = specs.len(), "spawning widget workers");

        let mut taken = HashSet::with_capacity(specs.len());
        let mut slots = Vec::with_capacity(specs.len());

        for (index, spec) in specs.into_iter().enumerate() {
            let name: Arc<str> = Arc::from(unique_name(&mut taken, spec.base_name(), index));
            let module = spec.module.clone();

            match self.spawn_one(Arc::clone(&name), spec, ctx) {
                Ok(widget) => {
                    tracing::debug!(
                        widget = %name,
                        module = %module,
                        widget_type = %widget.widget_type,
                        "widget worker spawned"
                    );
                    self.bus.publish(
                        Event::new(EventKind::WidgetSpawned)
                            .with_widget(Arc::clone(&name))
                            .with_module(module),
                    );
                    slots.push(Some(widget));
                }
                Err(e) => {
                    self.report_spawn_failure(&name, &module, &e);
                    slots.push(None);
                }
            }
        }
        Registry::from_slots(slots)
    }

    /// Loader → runtime check → bridge → spawn, for one widget.
    fn spawn_one<C: ScriptContext>(
        &self,
        name: Arc<str>,
        spec: WidgetSpec,
        ctx: &mut C,
    ) -> Result<Widget, WidgetError> {
        let loaded = self.modules.load(&spec.module)?;

        let Some(runtime) = self.runtime.as_ref() else {
            return Err(WidgetError::WorkerStart {
                widget: name.to_string(),
                reason: "no tokio runtime available".to_string(),
            });
        };

        let widget_type: Arc<str> = loaded
            .widget_type()
            .map(Arc::from)
            .unwrap_or_else(|| Arc::clone(&name));

        let script_object = install_widget_object(ctx, &widget_type, loaded.native_functions())
            .map_err(|e| WidgetError::WorkerStart {
                widget: name.to_string(),
                reason: format!("script bridge failed: {e}"),
            })?;

        let config = Arc::new(spec.config);
        let exit = Arc::new(ExitSignal::new());
        let handle = WidgetHandle::new(
            UpdateTarget::new(Arc::clone(&name), Arc::clone(&widget_type), Some(script_object)),
            Arc::clone(&config),
            self.stop.token(),
            self.updates.clone(),
        );

        let worker = WorkerThread::spawn(
            runtime.clone(),
            loaded.module(),
            handle,
            Arc::clone(&exit),
            self.bus.clone(),
        )
        .map_err(|e| WidgetError::WorkerStart {
            widget: name.to_string(),
            reason: format!("failed to create worker thread: {e}"),
        })?;

        Ok(Widget {
            name,
            widget_type,
            module: spec.module,
            config,
            script_object,
            exit,
            worker,
        })
    }

    fn report_spawn_failure(&self, name: &Arc<str>, module: &str, err: &WidgetError) {
        let kind = match err {
            WidgetError::ModuleLoad { reason, .. } => {
                tracing::warn!(widget = %name, module, reason = %reason, "loading of module failed");
                EventKind::ModuleLoadFailed
            }
            other => {
                tracing::error!(widget = %name, module, error = %other, "failed to start widget worker");
                EventKind::WorkerStartFailed
            }
        };
        self.bus.publish(
            Event::new(kind)
                .with_widget(Arc::clone(name))
                .with_module(module)
                .with_reason(err.to_string()),
        );
    }

    /// Stops every widget of `registry`, waiting up to the exit budget for each.
    ///
    /// Consumes the registry. Stragglers are aborted and listed in the report.
    pub async fn shutdown_all(&self, registry: Registry) -> ShutdownReport {
        let active = registry.active_count();
        if active == 0 {
            tracing::debug!("no widget workers have been spawned");
            return ShutdownReport {
                skipped: registry.len(),
                ..ShutdownReport::default()
            };
        }

        tracing::debug!(count = active, "gracefully shutting down widget workers");
        let report = shutdown::coordinate(
            registry.into_slots(),
            &self.stop,
            &self.bus,
            self.cfg.exit_grace,
        )
        .await;
        self.gate.close();
        report
    }

    /// Flushes pending events to the subscribers and stops their workers.
    pub async fn close(mut self) {
        if let Some(listener) = self.listener.take() {
            listener.done.cancel();
            if let Err(e) = listener.join.await {
                tracing::error!(error = %e, "event listener ended abnormally");
            }
        }
        if let Ok(subs) = Arc::try_unwrap(self.subs) {
            subs.shutdown().await;
        }
    }
}

/// Returns `base`, or `base#<n>` (n starting at the slot index) when `base` is taken.
fn unique_name(taken: &mut HashSet<String>, base: &str, index: usize) -> String {
    let mut name = base.to_string();
    let mut n = index;
    while taken.contains(&name) {
        name = format!("{base}#{n}");
        n += 1;
    }
    taken.insert(name.clone());
    name
}
