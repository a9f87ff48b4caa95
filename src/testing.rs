//! In-memory scripting environment for unit tests.

use std::collections::{HashMap, HashSet};

use crate::error::ScriptError;
use crate::script::{NativeFunction, ObjectHandle, ScriptContext, ScriptValue};

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum FakeValue {
    Bool(bool),
    Null,
    Number(f64),
    Str(String),
    Object(ObjectHandle),
    Undefined,
    Function(u64),
}

struct FakeObject {
    class: String,
    methods: Vec<NativeFunction>,
    props: HashMap<String, FakeValue>,
}

/// Records every call made to a script function.
pub(crate) struct FakeScript {
    next_id: u64,
    objects: HashMap<ObjectHandle, FakeObject>,
    globals: HashMap<String, FakeValue>,
    calls: Vec<(u64, Vec<FakeValue>)>,
    failing: HashSet<u64>,
}

impl FakeScript {
    pub(crate) fn new() -> Self {
        Self {
            next_id: 1,
            objects: HashMap::new(),
            globals: HashMap::new(),
            calls: Vec::new(),
            failing: HashSet::new(),
        }
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub(crate) fn plain_object(&mut self) -> ObjectHandle {
        self.create_object("Object", Vec::new())
            .expect("fake objects are always created")
    }

    pub(crate) fn global(&self, name: &str) -> Option<FakeValue> {
        self.globals.get(name).cloned()
    }

    pub(crate) fn global_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.globals.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    pub(crate) fn class_of(&self, obj: ObjectHandle) -> Option<String> {
        self.objects.get(&obj).map(|o| o.class.clone())
    }

    pub(crate) fn method_names(&self, obj: ObjectHandle) -> Vec<String> {
        self.objects
            .get(&obj)
            .map(|o| o.methods.iter().map(|m| m.name().to_string()).collect())
            .unwrap_or_default()
    }

    pub(crate) fn call_method(
        &self,
        obj: ObjectHandle,
        name: &str,
        args: &[ScriptValue],
    ) -> Option<Result<ScriptValue, ScriptError>> {
        let object = self.objects.get(&obj)?;
        let method = object.methods.iter().find(|m| m.name() == name)?;
        Some(method.call(args))
    }

    pub(crate) fn set_property(&mut self, obj: ObjectHandle, name: &str, value: FakeValue) {
        if let Some(o) = self.objects.get_mut(&obj) {
            o.props.insert(name.to_string(), value);
        }
    }

    /// Installs a recording `onDataChanged` handler and returns its function id.
    pub(crate) fn set_handler(&mut self, obj: ObjectHandle) -> u64 {
        let id = self.next_id();
        self.set_property(obj, "onDataChanged", FakeValue::Function(id));
        id
    }

    /// Like [`set_handler`](Self::set_handler), but every call throws.
    pub(crate) fn set_throwing_handler(&mut self, obj: ObjectHandle) -> u64 {
        let id = self.set_handler(obj);
        self.failing.insert(id);
        id
    }

    /// Forgets an object, as a page reload would.
    pub(crate) fn remove_object(&mut self, obj: ObjectHandle) {
        self.objects.remove(&obj);
    }

    pub(crate) fn calls(&self) -> &[(u64, Vec<FakeValue>)] {
        &self.calls
    }
}

impl ScriptContext for FakeScript {
    type Value = FakeValue;

    fn boolean(&mut self, v: bool) -> FakeValue {
        FakeValue::Bool(v)
    }

    fn null(&mut self) -> FakeValue {
        FakeValue::Null
    }

    fn number(&mut self, v: f64) -> FakeValue {
        FakeValue::Number(v)
    }

    fn string(&mut self, v: &str) -> FakeValue {
        FakeValue::Str(v.to_owned())
    }

    fn object(&mut self, handle: ObjectHandle) -> FakeValue {
        FakeValue::Object(handle)
    }

    fn undefined(&mut self) -> FakeValue {
        FakeValue::Undefined
    }

    fn contains_object(&self, handle: ObjectHandle) -> bool {
        self.objects.contains_key(&handle)
    }

    fn create_object(
        &mut self,
        class_name: &str,
        methods: Vec<NativeFunction>,
    ) -> Result<ObjectHandle, ScriptError> {
        let handle = ObjectHandle::from_raw(self.next_id());
        self.objects.insert(
            handle,
            FakeObject {
                class: class_name.to_string(),
                methods,
                props: HashMap::new(),
            },
        );
        Ok(handle)
    }

    fn set_global(&mut self, name: &str, value: FakeValue) -> Result<(), ScriptError> {
        self.globals.insert(name.to_string(), value);
        Ok(())
    }

    fn get_property(&mut self, object: ObjectHandle, name: &str) -> Result<FakeValue, ScriptError> {
        let o = self
            .objects
            .get(&object)
            .ok_or(ScriptError::UnknownObject(object.raw()))?;
        Ok(o.props.get(name).cloned().unwrap_or(FakeValue::Undefined))
    }

    fn is_function(&self, value: &FakeValue) -> bool {
        matches!(value, FakeValue::Function(_))
    }

    fn call_function(
        &mut self,
        function: &FakeValue,
        args: &[FakeValue],
    ) -> Result<FakeValue, ScriptError> {
        let FakeValue::Function(id) = function else {
            return Err(ScriptError::Exception("not a function".into()));
        };
        self.calls.push((*id, args.to_vec()));
        if self.failing.contains(id) {
            return Err(ScriptError::Exception("handler threw".into()));
        }
        Ok(FakeValue::Undefined)
    }
}
