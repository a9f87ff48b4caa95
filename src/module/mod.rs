//! Widget modules: the contract, a closure-backed implementation and the loader.
//!
//! - [`WidgetModule`] what a module provides (worker entry point, type, natives)
//! - [`WidgetFn`] closure-backed module for in-process widgets
//! - [`ModuleRegistry`] resolves module names; with the `dylib` feature it also opens shared libraries

#[cfg(feature = "dylib")]
mod dylib;
mod module;
mod module_fn;
mod registry;

#[cfg(feature = "dylib")]
pub use dylib::DylibLoader;
pub use module::{ModuleRef, WidgetModule};
pub use module_fn::WidgetFn;
pub use registry::{LoadedModule, ModuleRegistry};
