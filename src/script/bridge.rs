//! # Script bridge: the per-widget object seen by script.
//!
//! Every widget gets one object in the scripting environment, of class
//! `widget_<type>`, bound to a global of the same name. The page attaches its
//! `onDataChanged` handler to that object; the module's native functions are
//! its methods.

use crate::error::ScriptError;
use crate::script::context::ScriptContext;
use crate::script::value::{NativeFunction, ObjectHandle};

/// Longest class name, in bytes.
pub const MAX_CLASS_NAME_LEN: usize = 63;

/// Returns the class (and global) name for a widget type: `widget_<type>`.
///
/// Names longer than [`MAX_CLASS_NAME_LEN`] bytes are cut on a char boundary.
pub fn class_name(widget_type: &str) -> String {
    let mut name = format!("widget_{widget_type}");
    if name.len() > MAX_CLASS_NAME_LEN {
        let mut end = MAX_CLASS_NAME_LEN;
        while !name.is_char_boundary(end) {
            end -= 1;
        }
        name.truncate(end);
    }
    name
}

/// Creates the widget object, installs it as a global and returns its handle.
///
/// Must run on the thread owning `ctx`. Ownership of `native_functions` moves
/// into the environment.
pub fn install_widget_object<C: ScriptContext>(
    ctx: &mut C,
    widget_type: &str,
    native_functions: Vec<NativeFunction>,
) -> Result<ObjectHandle, ScriptError> {
    let name = class_name(widget_type);
    let object = ctx.create_object(&name, native_functions)?;
    let value = ctx.object(object);
    ctx.set_global(&name, value)?;
    Ok(object)
}
