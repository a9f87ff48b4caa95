//! # Module registry: resolves a module name to a loaded [`WidgetModule`].
//!
//! Lookup order:
//! 1. modules registered in-process ([`ModuleRegistry::register`]);
//! 2. with the `dylib` feature and a module directory, `libwidget_<name>` from that directory.
//!
//! A failed lookup is reported as [`WidgetError::ModuleLoad`]; it never aborts the caller.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::WidgetError;
use crate::module::module::{ModuleRef, WidgetModule};
use crate::script::NativeFunction;

#[cfg(feature = "dylib")]
use crate::module::dylib::DylibLoader;

/// Named collection of widget modules.
#[derive(Clone, Default)]
pub struct ModuleRegistry {
    modules: HashMap<String, ModuleRef>,
    #[cfg(feature = "dylib")]
    dylib: Option<DylibLoader>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `module` under `name`, replacing any previous module of that name.
    pub fn register(&mut self, name: impl Into<String>, module: impl WidgetModule) {
        self.register_arc(name, Arc::new(module));
    }

    /// Registers an already shared module.
    pub fn register_arc(&mut self, name: impl Into<String>, module: ModuleRef) {
        self.modules.insert(name.into(), module);
    }

    /// Builder-style [`register`](Self::register).
    pub fn with_module(mut self, name: impl Into<String>, module: impl WidgetModule) -> Self {
        self.register(name, module);
        self
    }

    /// Returns `true` if `name` is registered in-process.
    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    /// Sorted names of the in-process modules.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.modules.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Enables loading of shared modules from `dir`.
    #[cfg(feature = "dylib")]
    pub fn set_module_dir(&mut self, dir: impl Into<std::path::PathBuf>) {
        self.dylib = Some(DylibLoader::new(dir));
    }

    /// Resolves `name` to a module.
    pub fn load(&self, name: &str) -> Result<LoadedModule, WidgetError> {
        if let Some(module) = self.modules.get(name) {
            return Ok(LoadedModule {
                name: name.to_string(),
                module: Arc::clone(module),
            });
        }

        #[cfg(feature = "dylib")]
        if let Some(loader) = &self.dylib {
            return loader.load(name).map(|module| LoadedModule {
                name: name.to_string(),
                module,
            });
        }

        Err(WidgetError::ModuleLoad {
            module: name.to_string(),
            reason: "module is not registered".to_string(),
        })
    }
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("modules", &self.names())
            .finish_non_exhaustive()
    }
}

/// A resolved module, ready to spawn workers from.
#[derive(Clone)]
pub struct LoadedModule {
    name: String,
    module: ModuleRef,
}

impl LoadedModule {
    /// Name the module was requested by.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared widget type, if the module has one.
    pub fn widget_type(&self) -> Option<String> {
        self.module.widget_type()
    }

    /// Native functions exported to script (possibly empty).
    pub fn native_functions(&self) -> Vec<NativeFunction> {
        self.module.native_functions()
    }

    /// The shared module itself.
    pub fn module(&self) -> ModuleRef {
        Arc::clone(&self.module)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::WidgetHandle;
    use crate::error::WorkerError;
    use crate::module::WidgetFn;
    use crate::script::ScriptValue;

    fn idle() -> WidgetFn<impl Fn(WidgetHandle) -> futures::future::Ready<Result<(), WorkerError>>>
    {
        WidgetFn::new(|_handle: WidgetHandle| futures::future::ready(Ok(())))
    }

    #[test]
    fn unknown_module_is_a_load_error() {
        let registry = ModuleRegistry::new().with_module("volume", idle());

        let err = registry.load("does_not_exist").err().unwrap();
        assert_eq!(err.as_label(), "module_load_failed");
        assert_eq!(err.subject(), "does_not_exist");
    }

    #[test]
    fn loaded_module_exposes_type_and_natives() {
        let module = idle()
            .with_type("audio")
            .with_native(crate::script::NativeFunction::new("mute", |_| {
                Ok(ScriptValue::Boolean(true))
            }));
        let registry = ModuleRegistry::new().with_module("volume", module);

        let loaded = registry.load("volume").unwrap();
        assert_eq!(loaded.name(), "volume");
        assert_eq!(loaded.widget_type().as_deref(), Some("audio"));
        let natives = loaded.native_functions();
        assert_eq!(natives.len(), 1);
        assert_eq!(natives[0].name(), "mute");
    }

    #[test]
    fn names_are_sorted() {
        let registry = ModuleRegistry::new()
            .with_module("mpd", idle())
            .with_module("clock", idle());
        assert_eq!(registry.names(), vec!["clock".to_string(), "mpd".to_string()]);
        assert!(registry.contains("mpd"));
        assert!(!registry.contains("volume"));
    }
}
