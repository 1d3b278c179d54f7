//! Host objects answering script-style property access.
//!
//! A read resolves, in order: stored fields, the built-in methods every
//! script object exposes, the synthesized `constructor` and `prototype`
//! proxies, and finally a getter from the descriptor table. A write goes to
//! the setter when one is installed and is otherwise stored as a plain
//! field.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use core_types::{Error, HostObject, NativeFunction, Result, Value};
use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::attributes::PropertyAttributes;
use crate::class::ClassDescriptor;
use crate::property_table::PropertyTable;
use crate::proxy::{ConstructorProxy, PrototypeProxy};

/// Script-visible methods present on every script object
pub const BUILTIN_METHODS: &[&str] = &[
    "toString",
    "toLocaleString",
    "valueOf",
    "hasOwnProperty",
    "isPrototypeOf",
    "watch",
    "unwatch",
    "__defineGetter__",
    "__defineSetter__",
    "__lookupGetter__",
    "__lookupSetter__",
];

#[derive(Debug, Clone)]
struct Field {
    value: Value,
    attributes: PropertyAttributes,
}

/// An instance of a registered host class.
///
/// # Examples
///
/// ```
/// use core_types::{NativeFunction, Value};
/// use object_model::ClassDescriptor;
///
/// let obj = ClassDescriptor::plain("Counter").instantiate();
/// obj.define_getter("x", NativeFunction::new("get x", |_| Ok(Value::from(42))));
///
/// assert_eq!(obj.get("x").unwrap(), Value::from(42));
/// assert!(obj.get("y").is_err());
/// ```
pub struct ScriptObject {
    class: Arc<ClassDescriptor>,
    this: Weak<ScriptObject>,
    fields: RwLock<HashMap<String, Field>>,
    properties: PropertyTable,
}

impl ScriptObject {
    /// Create an empty instance of `class`
    pub fn new(class: Arc<ClassDescriptor>) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            class,
            this: this.clone(),
            fields: RwLock::new(HashMap::new()),
            properties: PropertyTable::new(),
        })
    }

    /// The class this object belongs to
    pub fn class(&self) -> &Arc<ClassDescriptor> {
        &self.class
    }

    /// Accessor and watch-point tables of this instance
    pub fn properties(&self) -> &PropertyTable {
        &self.properties
    }

    /// Resolve a property read. `Ok(None)` is a miss.
    pub fn lookup(&self, name: &str) -> Result<Option<Value>> {
        let stored = self.fields.read().get(name).map(|f| f.value.clone());
        if stored.is_some() {
            return Ok(stored);
        }

        if let Some(method) = self.builtin_method(name) {
            return Ok(Some(Value::Function(method)));
        }

        match name {
            "constructor" => return Ok(Some(Value::Object(Arc::new(self.constructor())))),
            "prototype" => return Ok(Some(Value::Object(Arc::new(self.prototype())))),
            _ => {}
        }

        match self.properties.lookup_getter(name) {
            Some(getter) => getter.call(Vec::new()).map(Some),
            None => Ok(None),
        }
    }

    /// Read a property, failing with [`Error::Attribute`] on a miss
    pub fn get(&self, name: &str) -> Result<Value> {
        self.lookup(name)?
            .ok_or_else(|| Error::Attribute(name.to_string()))
    }

    /// Write a property. Returns `Ok(false)` when a read-only field refuses
    /// the assignment.
    pub fn set(&self, name: &str, value: Value) -> Result<bool> {
        if let Some(setter) = self.properties.lookup_setter(name) {
            trace!(class = self.class.name(), property = name, "dispatching to setter");
            setter.call(vec![value])?;
            return Ok(true);
        }

        let mut fields = self.fields.write();
        match fields.get_mut(name) {
            Some(field) if field.attributes.contains(PropertyAttributes::READ_ONLY) => {
                debug!(
                    class = self.class.name(),
                    property = name,
                    "assignment to read-only field refused"
                );
                Ok(false)
            }
            Some(field) => {
                field.value = value;
                Ok(true)
            }
            None => {
                fields.insert(
                    name.to_string(),
                    Field {
                        value,
                        attributes: PropertyAttributes::NONE,
                    },
                );
                Ok(true)
            }
        }
    }

    /// Store a field with explicit attributes, bypassing setters
    pub fn define_field(&self, name: &str, value: Value, attributes: PropertyAttributes) {
        self.fields
            .write()
            .insert(name.to_string(), Field { value, attributes });
    }

    /// Attributes of a stored field
    pub fn field_attributes(&self, name: &str) -> Option<PropertyAttributes> {
        self.fields.read().get(name).map(|f| f.attributes)
    }

    /// Remove a stored field. Returns `false` when the field is marked
    /// `DONT_DELETE`.
    pub fn delete(&self, name: &str) -> bool {
        let mut fields = self.fields.write();
        match fields.get(name) {
            Some(field) if field.attributes.contains(PropertyAttributes::DONT_DELETE) => false,
            _ => {
                fields.remove(name);
                true
            }
        }
    }

    /// Enumerable own keys: visible fields plus accessor properties
    pub fn own_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .fields
            .read()
            .iter()
            .filter(|(_, f)| f.attributes.is_enumerable())
            .map(|(name, _)| name.clone())
            .collect();
        keys.extend(self.properties.accessor_names());
        keys.sort();
        keys.dedup();
        keys
    }

    /// Synthesized constructor proxy for this object's class
    pub fn constructor(&self) -> ConstructorProxy {
        ConstructorProxy::new(Arc::clone(&self.class))
    }

    /// Synthesized prototype proxy for this object's class
    pub fn prototype(&self) -> PrototypeProxy {
        PrototypeProxy::new(Arc::clone(&self.class))
    }

    /// `toLocaleString()`: same rendering as `toString()`
    pub fn to_locale_string(&self) -> String {
        self.to_string()
    }

    /// `valueOf()`: the object itself
    pub fn value_of(&self) -> Result<Value> {
        Ok(Value::Object(self.handle()?))
    }

    /// `hasOwnProperty(name)`: whether a read of `name` resolves
    pub fn has_own_property(&self, name: &str) -> bool {
        matches!(self.lookup(name), Ok(Some(_)))
    }

    /// `isPrototypeOf(obj)` is not implemented
    pub fn is_prototype_of(&self, _obj: &Value) -> Result<bool> {
        Err(Error::NotSupported("isPrototypeOf".to_string()))
    }

    /// Install or replace the getter for `name`
    pub fn define_getter(&self, name: &str, getter: NativeFunction) {
        self.properties.define_getter(name, getter);
    }

    /// Install or replace the setter for `name`
    pub fn define_setter(&self, name: &str, setter: NativeFunction) {
        self.properties.define_setter(name, setter);
    }

    /// The getter bound to `name`, if any
    pub fn lookup_getter(&self, name: &str) -> Option<NativeFunction> {
        self.properties.lookup_getter(name)
    }

    /// The setter bound to `name`, if any
    pub fn lookup_setter(&self, name: &str) -> Option<NativeFunction> {
        self.properties.lookup_setter(name)
    }

    /// Register a watch-point on `prop`
    pub fn watch(&self, prop: &str, handler: NativeFunction) {
        self.properties.watch(prop, handler);
    }

    /// Remove the watch-point on `prop`; fails when none is registered
    pub fn unwatch(&self, prop: &str) -> Result<()> {
        self.properties
            .unwatch(prop)
            .map(|_| ())
            .ok_or_else(|| Error::Attribute(prop.to_string()))
    }

    fn handle(&self) -> Result<Arc<ScriptObject>> {
        self.this
            .upgrade()
            .ok_or_else(|| Error::state("ScriptObject::handle", "object is being dropped"))
    }

    fn builtin_method(&self, name: &str) -> Option<NativeFunction> {
        let method = match name {
            "toString" => self.bound(name, |obj, _| Ok(Value::String(obj.to_string()))),
            "toLocaleString" => {
                self.bound(name, |obj, _| Ok(Value::String(obj.to_locale_string())))
            }
            "valueOf" => self.bound(name, |obj, _| obj.value_of()),
            "hasOwnProperty" => self.bound(name, |obj, args| {
                let prop = string_arg(&args, 0, "hasOwnProperty")?;
                Ok(Value::Boolean(obj.has_own_property(&prop)))
            }),
            "isPrototypeOf" => self.bound(name, |obj, args| {
                let other = args.into_iter().next().unwrap_or(Value::Undefined);
                obj.is_prototype_of(&other).map(Value::Boolean)
            }),
            "watch" => self.bound(name, |obj, args| {
                let prop = string_arg(&args, 0, "watch")?;
                let handler = function_arg(&args, 1, "watch")?;
                obj.watch(&prop, handler);
                Ok(Value::Undefined)
            }),
            "unwatch" => self.bound(name, |obj, args| {
                let prop = string_arg(&args, 0, "unwatch")?;
                obj.unwatch(&prop)?;
                Ok(Value::Undefined)
            }),
            "__defineGetter__" => self.bound(name, |obj, args| {
                let prop = string_arg(&args, 0, "__defineGetter__")?;
                obj.define_getter(&prop, function_arg(&args, 1, "__defineGetter__")?);
                Ok(Value::Undefined)
            }),
            "__defineSetter__" => self.bound(name, |obj, args| {
                let prop = string_arg(&args, 0, "__defineSetter__")?;
                obj.define_setter(&prop, function_arg(&args, 1, "__defineSetter__")?);
                Ok(Value::Undefined)
            }),
            "__lookupGetter__" => self.bound(name, |obj, args| {
                let prop = string_arg(&args, 0, "__lookupGetter__")?;
                Ok(obj
                    .lookup_getter(&prop)
                    .map(Value::Function)
                    .unwrap_or(Value::Undefined))
            }),
            "__lookupSetter__" => self.bound(name, |obj, args| {
                let prop = string_arg(&args, 0, "__lookupSetter__")?;
                Ok(obj
                    .lookup_setter(&prop)
                    .map(Value::Function)
                    .unwrap_or(Value::Undefined))
            }),
            _ => return None,
        };
        Some(method)
    }

    fn bound<F>(&self, name: &str, body: F) -> NativeFunction
    where
        F: Fn(&ScriptObject, Vec<Value>) -> Result<Value> + Send + Sync + 'static,
    {
        let this = self.this.clone();
        NativeFunction::new(name, move |args| {
            let obj = this
                .upgrade()
                .ok_or_else(|| Error::state("ScriptObject::call", "object is being dropped"))?;
            body(&obj, args)
        })
    }
}

pub(crate) fn string_arg(args: &[Value], index: usize, method: &str) -> Result<String> {
    match args.get(index) {
        Some(Value::String(s)) => Ok(s.clone()),
        other => Err(Error::Type(format!(
            "{} expects a string at argument {}, got {:?}",
            method, index, other
        ))),
    }
}

pub(crate) fn function_arg(args: &[Value], index: usize, method: &str) -> Result<NativeFunction> {
    match args.get(index) {
        Some(Value::Function(f)) => Ok(f.clone()),
        other => Err(Error::Type(format!(
            "{} expects a function at argument {}, got {:?}",
            method, index, other
        ))),
    }
}

impl fmt::Display for ScriptObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[object {}]", self.class.name())
    }
}

impl fmt::Debug for ScriptObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<String> = self.fields.read().keys().cloned().collect();
        keys.sort();
        f.debug_struct("ScriptObject")
            .field("class", &self.class.name())
            .field("fields", &keys)
            .finish()
    }
}

impl HostObject for ScriptObject {
    fn class_name(&self) -> &str {
        self.class.name()
    }

    fn get_property(&self, name: &str) -> Result<Option<Value>> {
        self.lookup(name)
    }

    fn set_property(&self, name: &str, value: Value) -> Result<bool> {
        self.set(name, value)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
