//! Scripting side: values, the environment seam, the bridge and the callback.
//!
//! ## Contents
//! - [`ScriptValue`], [`ObjectHandle`], [`NativeFunction`] plain data that may cross threads
//! - [`ScriptContext`] the embedded environment, borrowed on its owning thread only
//! - [`install_widget_object`] creates the `widget_<type>` global for a widget
//! - [`deliver_update`] runs a widget's `onDataChanged` for one queued update

mod bridge;
mod callback;
mod context;
mod value;

pub use bridge::{MAX_CLASS_NAME_LEN, class_name, install_widget_object};
pub use callback::{DATA_CHANGED_HANDLER, Delivery, deliver_update, marshal};
pub use context::ScriptContext;
pub use value::{NativeFn, NativeFunction, ObjectHandle, ScriptValue, ValueKind};
