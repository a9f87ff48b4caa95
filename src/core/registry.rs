//! # Widget registry: one slot per configured widget.
//!
//! Created by [`LifecycleManager::spawn_all`](crate::LifecycleManager::spawn_all)
//! and consumed by [`LifecycleManager::shutdown_all`](crate::LifecycleManager::shutdown_all).
//!
//! ## Rules
//! - Slot `i` belongs to the `i`-th spec of the spawn cycle, whether it spawned or not.
//! - `None` marks a failed spawn and counts as already terminated during shutdown.
//! - A [`Widget`] owns its worker thread until it is joined or aborted.

use std::sync::Arc;

use serde_json::Value;

use crate::core::exit::ExitSignal;
use crate::core::runner::WorkerThread;
use crate::script::ObjectHandle;

/// One running instance of a loaded module.
pub struct Widget {
    pub(crate) name: Arc<str>,
    pub(crate) widget_type: Arc<str>,
    pub(crate) module: String,
    pub(crate) config: Arc<Value>,
    pub(crate) script_object: ObjectHandle,
    pub(crate) exit: Arc<ExitSignal>,
    pub(crate) worker: WorkerThread,
}

impl Widget {
    /// Unique widget name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Logical widget type.
    pub fn widget_type(&self) -> &str {
        &self.widget_type
    }

    /// Module the widget was loaded from.
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Configuration shared with the worker.
    pub fn config(&self) -> &Value {
        &self.config
    }

    /// The widget's object in the scripting environment.
    pub fn script_object(&self) -> ObjectHandle {
        self.script_object
    }

    /// Returns `true` once the worker thread has finished.
    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }
}

impl std::fmt::Debug for Widget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Widget")
            .field("name", &self.name)
            .field("widget_type", &self.widget_type)
            .field("module", &self.module)
            .field("script_object", &self.script_object)
            .field("finished", &self.is_finished())
            .finish_non_exhaustive()
    }
}

/// Ordered widgets of one spawn cycle.
#[derive(Debug, Default)]
pub struct Registry {
    slots: Vec<Option<Widget>>,
}

impl Registry {
    pub(crate) fn from_slots(slots: Vec<Option<Widget>>) -> Self {
        Self { slots }
    }

    pub(crate) fn into_slots(self) -> Vec<Option<Widget>> {
        self.slots
    }

    /// Number of slots (equals the number of configured widgets).
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of widgets that were spawned.
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Returns `true` if slot `index` holds a widget whose worker is still running.
    pub fn is_running(&self, index: usize) -> bool {
        self.widget(index).is_some_and(|w| !w.is_finished())
    }

    /// Widget in slot `index`, if it was spawned.
    pub fn widget(&self, index: usize) -> Option<&Widget> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Spawned widgets in slot order.
    pub fn widgets(&self) -> impl Iterator<Item = &Widget> {
        self.slots.iter().flatten()
    }

    /// Names of the spawned widgets in slot order.
    pub fn names(&self) -> Vec<&str> {
        self.widgets().map(Widget::name).collect()
    }
}
