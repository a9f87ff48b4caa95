//! # Scripting environment seam.
//!
//! [`ScriptContext`] is what the rendering surface lends to this crate: the
//! embedded script engine of the bar page. It is only ever borrowed `&mut` on
//! the thread that owns it; nothing here requires it to be `Send`.

use crate::error::ScriptError;
use crate::script::value::{NativeFunction, ObjectHandle};

/// Operations the widget runtime needs from an embedded scripting environment.
///
/// `Value` is the environment's own value type. Constructors (`boolean`,
/// `string`, ...) build values inside the environment; strings are copied.
pub trait ScriptContext {
    /// The environment's value representation.
    type Value: Clone;

    fn boolean(&mut self, v: bool) -> Self::Value;
    fn null(&mut self) -> Self::Value;
    fn number(&mut self, v: f64) -> Self::Value;
    fn string(&mut self, v: &str) -> Self::Value;
    fn object(&mut self, handle: ObjectHandle) -> Self::Value;
    fn undefined(&mut self) -> Self::Value;

    /// Returns `true` while `handle` refers to a live object of this environment.
    ///
    /// Handles go stale when the page is reloaded.
    fn contains_object(&self, handle: ObjectHandle) -> bool;

    /// Creates an object of class `class_name` whose methods are `methods`.
    fn create_object(
        &mut self,
        class_name: &str,
        methods: Vec<NativeFunction>,
    ) -> Result<ObjectHandle, ScriptError>;

    /// Binds `value` to the global `name`.
    fn set_global(&mut self, name: &str, value: Self::Value) -> Result<(), ScriptError>;

    /// Reads property `name` of `object`; unset properties read as `undefined`.
    fn get_property(&mut self, object: ObjectHandle, name: &str)
    -> Result<Self::Value, ScriptError>;

    /// Returns `true` if `value` can be called.
    fn is_function(&self, value: &Self::Value) -> bool;

    /// Calls `function` synchronously with a `null` receiver.
    fn call_function(
        &mut self,
        function: &Self::Value,
        args: &[Self::Value],
    ) -> Result<Self::Value, ScriptError>;
}
