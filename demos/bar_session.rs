//! # Example: bar_session
//!
//! One bar session from spawn to shutdown, with a console stand-in for the
//! page's script engine.
//!
//! Demonstrates how to:
//! - Register widget modules built from closures with [`WidgetFn`].
//! - Read the widget list from a bar configuration document.
//! - Hold updates back until the surface is ready, then deliver them in order.
//! - Shut down with a bounded wait, including a widget that ignores the stop.
//!
//! ## Flow
//! ```text
//! spawn_all([volume, clock, stuck, battery])
//!     ├─► battery: ModuleLoadFailed (slot left empty)
//!     └─► volume/clock/stuck workers running
//! surface_ready() ──► updates delivered to widget_<type>.onDataChanged
//! shutdown_all()
//!     ├─► volume, clock: WidgetJoined
//!     └─► stuck: ExitTimedOut after 500ms, thread detached
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example bar_session --features logging
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing_subscriber::EnvFilter;
use widgetvisor::{
    LifecycleManager, LogWriter, ManagerConfig, ModuleRegistry, NativeFunction, ObjectHandle,
    ScriptContext, ScriptError, ScriptValue, Subscribe, WidgetFn, WidgetHandle, WidgetSpec,
    WorkerError, deliver_update,
};

/// Values of the console script engine.
#[derive(Clone, Debug)]
enum ConsoleValue {
    Bool(bool),
    Null,
    Number(f64),
    Str(String),
    Object(ObjectHandle),
    Undefined,
    Handler(String),
}

/// Prints every `onDataChanged` call instead of rendering it.
#[derive(Default)]
struct ConsoleScript {
    next: u64,
    classes: HashMap<ObjectHandle, String>,
    globals: HashMap<String, ConsoleValue>,
}

impl ScriptContext for ConsoleScript {
    type Value = ConsoleValue;

    fn boolean(&mut self, v: bool) -> ConsoleValue {
        ConsoleValue::Bool(v)
    }
    fn null(&mut self) -> ConsoleValue {
        ConsoleValue::Null
    }
    fn number(&mut self, v: f64) -> ConsoleValue {
        ConsoleValue::Number(v)
    }
    fn string(&mut self, v: &str) -> ConsoleValue {
        ConsoleValue::Str(v.to_owned())
    }
    fn object(&mut self, handle: ObjectHandle) -> ConsoleValue {
        ConsoleValue::Object(handle)
    }
    fn undefined(&mut self) -> ConsoleValue {
        ConsoleValue::Undefined
    }

    fn contains_object(&self, handle: ObjectHandle) -> bool {
        self.classes.contains_key(&handle)
    }

    fn create_object(
        &mut self,
        class_name: &str,
        methods: Vec<NativeFunction>,
    ) -> Result<ObjectHandle, ScriptError> {
        self.next += 1;
        let handle = ObjectHandle::from_raw(self.next);
        let names: Vec<&str> = methods.iter().map(NativeFunction::name).collect();
        println!("[script] new {class_name} {{ {} }}", names.join(", "));
        self.classes.insert(handle, class_name.to_string());
        Ok(handle)
    }

    fn set_global(&mut self, name: &str, value: ConsoleValue) -> Result<(), ScriptError> {
        self.globals.insert(name.to_string(), value);
        Ok(())
    }

    fn get_property(
        &mut self,
        object: ObjectHandle,
        name: &str,
    ) -> Result<ConsoleValue, ScriptError> {
        let class = self
            .classes
            .get(&object)
            .ok_or(ScriptError::UnknownObject(object.raw()))?;
        Ok(match name {
            "onDataChanged" => ConsoleValue::Handler(class.clone()),
            _ => ConsoleValue::Undefined,
        })
    }

    fn is_function(&self, value: &ConsoleValue) -> bool {
        matches!(value, ConsoleValue::Handler(_))
    }

    fn call_function(
        &mut self,
        function: &ConsoleValue,
        args: &[ConsoleValue],
    ) -> Result<ConsoleValue, ScriptError> {
        if let ConsoleValue::Handler(class) = function {
            println!("[script] {class}.onDataChanged({args:?})");
        }
        Ok(ConsoleValue::Undefined)
    }
}

fn modules() -> ModuleRegistry {
    let volume = WidgetFn::new(|handle: WidgetHandle| async move {
        let step = handle.config()["step"].as_f64().unwrap_or(5.0);
        let mut level = 50.0;
        while !handle.is_stopping() {
            handle
                .update(vec![ScriptValue::from(level), ScriptValue::from(false)])
                .await?;
            level = (level + step) % 100.0;
            tokio::select! {
                _ = handle.stopped() => break,
                _ = tokio::time::sleep(Duration::from_millis(300)) => {}
            }
        }
        Ok::<(), WorkerError>(())
    })
    .with_type("audio")
    .with_native(NativeFunction::new("toggle_mute", |_| {
        Ok(ScriptValue::Boolean(true))
    }));

    let clock = WidgetFn::new(|handle: WidgetHandle| async move {
        let mut tick = 0u32;
        while !handle.is_stopping() {
            tick += 1;
            handle.update(vec![format!("tick {tick}").into()]).await?;
            tokio::select! {
                _ = handle.stopped() => return Err(WorkerError::Canceled),
                _ = tokio::time::sleep(Duration::from_millis(500)) => {}
            }
        }
        Ok::<(), WorkerError>(())
    });

    // Blocking poll loop that never looks at the stop notification.
    let stuck = WidgetFn::new(|handle: WidgetHandle| async move {
        while handle.config()["poll"].as_bool().unwrap_or(true) {
            std::thread::sleep(Duration::from_millis(100));
        }
        Ok::<(), WorkerError>(())
    });

    ModuleRegistry::new()
        .with_module("volume", volume)
        .with_module("clock", clock)
        .with_module("stuck", stuck)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let bar = json!({
        "widgets": [
            { "module": "volume", "config": { "step": 10 } },
            { "module": "clock", "name": "left_clock" },
            { "module": "stuck" },
            { "module": "battery" }
        ]
    });
    let specs = WidgetSpec::list_from_bar_config(&bar)?;

    let cfg = ManagerConfig {
        exit_grace: Duration::from_millis(500),
        ..ManagerConfig::default()
    };
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let mut manager = LifecycleManager::builder(cfg)
        .with_modules(modules())
        .with_subscribers(subs)
        .build();
    let mut updates = manager
        .take_update_receiver()
        .ok_or_else(|| anyhow::anyhow!("update receiver already taken"))?;

    let mut ctx = ConsoleScript::default();
    let registry = manager.spawn_all(specs, &mut ctx);
    println!(
        "[bar] {} of {} widgets running: {:?}",
        registry.active_count(),
        registry.len(),
        registry.names()
    );

    // The page takes a moment to load; workers block on their first update meanwhile.
    tokio::time::sleep(Duration::from_millis(200)).await;
    manager.surface_ready();

    let session = tokio::time::sleep(Duration::from_secs(2));
    tokio::pin!(session);
    loop {
        tokio::select! {
            _ = &mut session => break,
            Some(update) = updates.next() => {
                if let Err(e) = deliver_update(&mut ctx, update) {
                    println!("[bar] delivery failed: {e}");
                }
            }
        }
    }

    let report = manager.shutdown_all(registry).await;
    println!(
        "[bar] joined={:?} forced={:?} skipped={}",
        report.joined,
        report.forced_names(),
        report.skipped
    );

    manager.close().await;
    Ok(())
}
