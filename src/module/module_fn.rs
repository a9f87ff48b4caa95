//! # Function-backed module (`WidgetFn`)
//!
//! [`WidgetFn`] wraps a closure `F: Fn(WidgetHandle) -> Fut`, producing a fresh
//! future per worker. Shared state between workers of the same module must be
//! put in an `Arc<...>` inside the closure explicitly.
//!
//! ## Example
//! ```rust
//! use widgetvisor::{ModuleRef, WidgetFn, WidgetHandle, WidgetModule, WorkerError};
//!
//! let m: ModuleRef = WidgetFn::new(|handle: WidgetHandle| async move {
//!     handle.stopped().await;
//!     Ok::<_, WorkerError>(())
//! })
//! .with_type("clock")
//! .arc();
//!
//! assert_eq!(m.widget_type().as_deref(), Some("clock"));
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::core::WidgetHandle;
use crate::error::WorkerError;
use crate::module::module::WidgetModule;
use crate::script::NativeFunction;

/// Function-backed module implementation.
pub struct WidgetFn<F> {
    widget_type: Option<Cow<'static, str>>,
    natives: Vec<NativeFunction>,
    f: F,
}

impl<F> WidgetFn<F> {
    /// Creates a module whose worker body is `f`.
    pub fn new(f: F) -> Self {
        Self {
            widget_type: None,
            natives: Vec::new(),
            f,
        }
    }

    /// Declares the logical widget type.
    pub fn with_type(mut self, widget_type: impl Into<Cow<'static, str>>) -> Self {
        self.widget_type = Some(widget_type.into());
        self
    }

    /// Adds a native function exposed to script.
    pub fn with_native(mut self, function: NativeFunction) -> Self {
        self.natives.push(function);
        self
    }

    /// Wraps the module in an `Arc`.
    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl<F, Fut> WidgetModule for WidgetFn<F>
where
    F: Fn(WidgetHandle) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), WorkerError>> + Send + 'static,
{
    async fn run(&self, handle: WidgetHandle) -> Result<(), WorkerError> {
        (self.f)(handle).await
    }

    fn widget_type(&self) -> Option<String> {
        self.widget_type.as_ref().map(|t| t.to_string())
    }

    fn native_functions(&self) -> Vec<NativeFunction> {
        self.natives.clone()
    }
}
