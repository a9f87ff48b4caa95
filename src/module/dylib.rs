//! # Shared-library widget modules (`dylib` feature).
//!
//! A module named `volume` is looked up as `libwidget_volume.so` (platform
//! naming via [`libloading::library_filename`]) inside the module directory.
//!
//! ## Exported symbols
//! | symbol                    | signature                                                   | required |
//! |---------------------------|-------------------------------------------------------------|----------|
//! | `widget_main`             | `fn(WidgetHandle) -> BoxFuture<'static, Result<(), WorkerError>>` | yes |
//! | `widget_type`             | `fn() -> String`                                            | no       |
//! | `widget_native_functions` | `fn() -> Vec<NativeFunction>`                               | no       |
//!
//! These are Rust-ABI symbols: a module must be built by the same compiler
//! against the same version of this crate as the host.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use libloading::Library;

use crate::core::WidgetHandle;
use crate::error::{WidgetError, WorkerError};
use crate::module::module::{ModuleRef, WidgetModule};
use crate::script::NativeFunction;

type EntryFn = fn(WidgetHandle) -> BoxFuture<'static, Result<(), WorkerError>>;
type TypeFn = fn() -> String;
type NativesFn = fn() -> Vec<NativeFunction>;

const ENTRY_SYMBOL: &[u8] = b"widget_main\0";
const TYPE_SYMBOL: &[u8] = b"widget_type\0";
const NATIVES_SYMBOL: &[u8] = b"widget_native_functions\0";

/// Opens widget modules from one installation directory.
#[derive(Clone, Debug)]
pub struct DylibLoader {
    dir: PathBuf,
}

impl DylibLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Full path of the library backing module `name`.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir
            .join(libloading::library_filename(format!("widget_{name}")))
    }

    /// Opens the library for `name` and resolves its entry points.
    pub fn load(&self, name: &str) -> Result<ModuleRef, WidgetError> {
        let path = self.path_for(name);
        let fail = |reason: String| WidgetError::ModuleLoad {
            module: name.to_string(),
            reason,
        };

        if !path.exists() {
            return Err(fail(format!("library not found: {}", path.display())));
        }

        // SAFETY: opening a library runs its initializers; modules are trusted host plugins.
        let lib = unsafe { Library::new(&path) }
            .map_err(|e| fail(format!("failed to open {}: {e}", path.display())))?;

        // SAFETY: symbol types are fixed by the module contract above.
        let entry: EntryFn = unsafe { lib.get::<EntryFn>(ENTRY_SYMBOL) }
            .map(|sym| *sym)
            .map_err(|e| fail(format!("missing widget_main in {}: {e}", path.display())))?;
        let widget_type = unsafe { lib.get::<TypeFn>(TYPE_SYMBOL) }
            .ok()
            .map(|sym| *sym);
        let natives = unsafe { lib.get::<NativesFn>(NATIVES_SYMBOL) }
            .ok()
            .map(|sym| *sym);

        tracing::debug!(module = name, path = %path.display(), "opened shared widget module");
        Ok(Arc::new(DylibModule {
            entry,
            widget_type,
            natives,
            _lib: Arc::new(lib),
        }))
    }
}

/// Module backed by an open shared library.
///
/// The library stays mapped for as long as any worker holds the module.
struct DylibModule {
    entry: EntryFn,
    widget_type: Option<TypeFn>,
    natives: Option<NativesFn>,
    _lib: Arc<Library>,
}

#[async_trait]
impl WidgetModule for DylibModule {
    async fn run(&self, handle: WidgetHandle) -> Result<(), WorkerError> {
        (self.entry)(handle).await
    }

    fn widget_type(&self) -> Option<String> {
        self.widget_type.map(|f| f())
    }

    fn native_functions(&self) -> Vec<NativeFunction> {
        self.natives.map(|f| f()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn library_name_follows_platform_convention() {
        let loader = DylibLoader::new("/usr/lib/bar/widgets");
        let path = loader.path_for("volume");
        let file = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(file.contains("widget_volume"), "unexpected file name {file}");
        assert!(path.starts_with("/usr/lib/bar/widgets"));
    }

    #[test]
    fn missing_library_is_a_load_error() {
        let loader = DylibLoader::new(std::env::temp_dir().join("widgetvisor-no-such-dir"));
        let err = loader.load("does_not_exist").err().unwrap();
        assert_eq!(err.as_label(), "module_load_failed");
        assert!(err.to_string().contains("library not found"));
    }

    /// A real shared library that exports none of the widget symbols.
    #[cfg(target_os = "linux")]
    fn system_libm() -> Option<PathBuf> {
        [
            "/lib/x86_64-linux-gnu/libm.so.6",
            "/usr/lib/x86_64-linux-gnu/libm.so.6",
            "/lib/aarch64-linux-gnu/libm.so.6",
            "/usr/lib/aarch64-linux-gnu/libm.so.6",
            "/lib64/libm.so.6",
            "/usr/lib64/libm.so.6",
            "/usr/lib/libm.so.6",
        ]
        .into_iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn missing_entry_point_is_a_load_error() {
        let Some(libm) = system_libm() else {
            return;
        };
        let dir = std::env::temp_dir().join(format!("widgetvisor-dylib-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let loader = DylibLoader::new(&dir);
        std::fs::copy(&libm, loader.path_for("mathonly")).unwrap();

        let err = loader.load("mathonly").err().unwrap();
        let _ = std::fs::remove_dir_all(&dir);

        assert_eq!(err.as_label(), "module_load_failed");
        assert_eq!(err.subject(), "mathonly");
        assert!(err.to_string().contains("widget_main"), "unexpected error: {err}");
    }
}
