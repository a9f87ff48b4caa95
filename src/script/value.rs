//! # Tagged values a widget reports to script.
//!
//! A worker describes an update as an ordered list of [`ScriptValue`]s. The
//! list crosses threads freely: it holds no scripting-environment state, only
//! plain data and opaque [`ObjectHandle`] ids.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::error::ScriptError;

/// Opaque id of an object living inside a scripting environment.
///
/// Handles are plain ids; only the thread owning the environment can resolve them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectHandle(u64);

impl ObjectHandle {
    /// Wraps an environment-specific object id.
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Returns the environment-specific object id.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// One element of an update's argument list.
#[derive(Clone, Debug, PartialEq)]
pub enum ScriptValue {
    Boolean(bool),
    Null,
    Number(f64),
    /// Copied into the environment's own string representation on delivery.
    String(String),
    /// An object that already exists in the environment.
    Object(ObjectHandle),
    Undefined,
}

/// Discriminant of a [`ScriptValue`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Boolean,
    Null,
    Number,
    String,
    Object,
    Undefined,
}

impl ScriptValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            ScriptValue::Boolean(_) => ValueKind::Boolean,
            ScriptValue::Null => ValueKind::Null,
            ScriptValue::Number(_) => ValueKind::Number,
            ScriptValue::String(_) => ValueKind::String,
            ScriptValue::Object(_) => ValueKind::Object,
            ScriptValue::Undefined => ValueKind::Undefined,
        }
    }
}

impl From<bool> for ScriptValue {
    fn from(v: bool) -> Self {
        ScriptValue::Boolean(v)
    }
}

impl From<f64> for ScriptValue {
    fn from(v: f64) -> Self {
        ScriptValue::Number(v)
    }
}

impl From<i32> for ScriptValue {
    fn from(v: i32) -> Self {
        ScriptValue::Number(f64::from(v))
    }
}

impl From<&str> for ScriptValue {
    fn from(v: &str) -> Self {
        ScriptValue::String(v.to_owned())
    }
}

impl From<String> for ScriptValue {
    fn from(v: String) -> Self {
        ScriptValue::String(v)
    }
}

impl From<ObjectHandle> for ScriptValue {
    fn from(v: ObjectHandle) -> Self {
        ScriptValue::Object(v)
    }
}

impl<T: Into<ScriptValue>> From<Option<T>> for ScriptValue {
    /// `None` maps to `null`.
    fn from(v: Option<T>) -> Self {
        v.map_or(ScriptValue::Null, Into::into)
    }
}

/// Implementation behind a [`NativeFunction`].
pub type NativeFn = Arc<dyn Fn(&[ScriptValue]) -> Result<ScriptValue, ScriptError> + Send + Sync>;

/// A module-supplied function exposed to script as a method of the widget object.
#[derive(Clone)]
pub struct NativeFunction {
    name: Cow<'static, str>,
    implementation: NativeFn,
}

impl NativeFunction {
    /// Creates a named native function.
    pub fn new<F>(name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn(&[ScriptValue]) -> Result<ScriptValue, ScriptError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            implementation: Arc::new(f),
        }
    }

    /// Method name as seen from script.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invokes the implementation.
    pub fn call(&self, args: &[ScriptValue]) -> Result<ScriptValue, ScriptError> {
        (self.implementation)(args)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions_pick_matching_kind() {
        assert_eq!(ScriptValue::from(true).kind(), ValueKind::Boolean);
        assert_eq!(ScriptValue::from(3).kind(), ValueKind::Number);
        assert_eq!(ScriptValue::from("ok").kind(), ValueKind::String);
        assert_eq!(ScriptValue::from(ObjectHandle::from_raw(7)).kind(), ValueKind::Object);
        assert_eq!(ScriptValue::from(None::<f64>).kind(), ValueKind::Null);
    }

    #[test]
    fn native_function_calls_through() {
        let f = NativeFunction::new("double", |args| match args {
            [ScriptValue::Number(n)] => Ok(ScriptValue::Number(n * 2.0)),
            _ => Err(ScriptError::Exception("expected one number".into())),
        });
        assert_eq!(f.name(), "double");
        assert_eq!(f.call(&[ScriptValue::Number(2.5)]), Ok(ScriptValue::Number(5.0)));
        assert!(f.call(&[]).is_err());
    }
}
