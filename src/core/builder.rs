use std::sync::Arc;

use tokio::runtime::Handle;

use crate::{
    config::ManagerConfig,
    events::Bus,
    module::ModuleRegistry,
    subscribers::{Subscribe, SubscriberSet},
};
use super::manager::LifecycleManager;

/// Builder for constructing a [`LifecycleManager`].
pub struct ManagerBuilder {
    cfg: ManagerConfig,
    modules: ModuleRegistry,
    subscribers: Vec<Arc<dyn Subscribe>>,
    runtime: Option<Handle>,
}

impl ManagerBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: ManagerConfig) -> Self {
        Self {
            cfg,
            modules: ModuleRegistry::new(),
            subscribers: Vec::new(),
            runtime: None,
        }
    }

    /// Sets the modules widgets are loaded from.
    pub fn with_modules(mut self, modules: ModuleRegistry) -> Self {
        self.modules = modules;
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events (spawns, failures, shutdown progress)
    /// through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Runs workers on `runtime` instead of the runtime current at [`build`](Self::build).
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Builds the manager.
    ///
    /// Without an explicit runtime the current one is used; with neither,
    /// every widget fails to start and subscribers are disabled.
    pub fn build(self) -> LifecycleManager {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let runtime = self.runtime.or_else(|| Handle::try_current().ok());

        #[allow(unused_mut)]
        let mut modules = self.modules;
        #[cfg(feature = "dylib")]
        if let Some(dir) = &self.cfg.module_dir {
            modules.set_module_dir(dir.clone());
        }

        let subs = match &runtime {
            Some(rt) => SubscriberSet::new(self.subscribers, bus.clone(), rt),
            None => {
                if !self.subscribers.is_empty() {
                    tracing::warn!("no tokio runtime available, event subscribers are disabled");
                }
                SubscriberSet::empty(bus.clone())
            }
        };

        LifecycleManager::new_internal(self.cfg, modules, bus, subs, runtime)
    }
}

impl LifecycleManager {
    /// Starts building a manager with `cfg`.
    pub fn builder(cfg: ManagerConfig) -> ManagerBuilder {
        ManagerBuilder::new(cfg)
    }
}
