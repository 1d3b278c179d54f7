//! Synthesized `constructor` and `prototype` proxies.
//!
//! Host classes have no script-side constructor function or prototype
//! object of their own. These proxies stand in for them: they report the
//! class name, render like native functions, and forward construction to
//! the class factory. Both also answer the built-in methods of script
//! objects, with accessors and watch-points kept on the class.

use std::any::Any;
use std::sync::Arc;

use core_types::{Error, HostObject, NativeFunction, ObjectRef, Result, Value};

use crate::class::ClassDescriptor;
use crate::object::{function_arg, string_arg};
use crate::property_table::PropertyTable;

/// Stand-in for the constructor function of a host class.
///
/// # Examples
///
/// ```
/// use object_model::{ClassDescriptor, ConstructorProxy};
///
/// let ctor = ConstructorProxy::new(ClassDescriptor::plain("Foo"));
/// assert_eq!(ctor.name(), "Foo");
/// assert_eq!(ctor.to_string(), "function Foo() {\n  [native code]\n}");
/// ```
#[derive(Debug, Clone)]
pub struct ConstructorProxy {
    class: Arc<ClassDescriptor>,
}

impl ConstructorProxy {
    /// Proxy for `class`
    pub fn new(class: Arc<ClassDescriptor>) -> Self {
        Self { class }
    }

    /// The class name
    pub fn name(&self) -> &str {
        self.class.name()
    }

    /// The class this proxy constructs
    pub fn class(&self) -> &Arc<ClassDescriptor> {
        &self.class
    }

    /// Construct a new instance, forwarding the arguments to the class factory
    pub fn construct(&self, args: Vec<Value>) -> Result<Value> {
        self.class.construct(args)
    }

    /// The matching prototype proxy
    pub fn prototype(&self) -> PrototypeProxy {
        PrototypeProxy::new(Arc::clone(&self.class))
    }
}

impl std::fmt::Display for ConstructorProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&native_code(self.name()))
    }
}

impl PartialEq for ConstructorProxy {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.class, &other.class)
    }
}

impl HostObject for ConstructorProxy {
    fn class_name(&self) -> &str {
        "Function"
    }

    fn get_property(&self, name: &str) -> Result<Option<Value>> {
        let value = match name {
            "name" => Value::from(self.name()),
            "prototype" => Value::Object(Arc::new(self.prototype())),
            _ => return ProxyKind::Constructor.lookup(&self.class, name),
        };
        Ok(Some(value))
    }

    fn set_property(&self, name: &str, value: Value) -> Result<bool> {
        ProxyKind::Constructor.assign(&self.class, name, value)
    }

    fn call(&self, args: Vec<Value>) -> Result<Value> {
        self.construct(args)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Stand-in for the prototype object of a host class.
///
/// # Examples
///
/// ```
/// use object_model::{ClassDescriptor, PrototypeProxy};
///
/// let proto = PrototypeProxy::new(ClassDescriptor::plain("Foo"));
/// assert_eq!(proto.name(), "Foo");
/// assert_eq!(proto.constructor().name(), "Foo");
/// ```
#[derive(Debug, Clone)]
pub struct PrototypeProxy {
    class: Arc<ClassDescriptor>,
}

impl PrototypeProxy {
    /// Proxy for `class`
    pub fn new(class: Arc<ClassDescriptor>) -> Self {
        Self { class }
    }

    /// The class name
    pub fn name(&self) -> &str {
        self.class.name()
    }

    /// Constructor proxy of the same class
    pub fn constructor(&self) -> ConstructorProxy {
        ConstructorProxy::new(Arc::clone(&self.class))
    }
}

impl PartialEq for PrototypeProxy {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.class, &other.class)
    }
}

impl HostObject for PrototypeProxy {
    fn class_name(&self) -> &str {
        "Object"
    }

    fn get_property(&self, name: &str) -> Result<Option<Value>> {
        let value = match name {
            "name" => Value::from(self.name()),
            "constructor" => Value::Object(Arc::new(self.constructor())),
            _ => return ProxyKind::Prototype.lookup(&self.class, name),
        };
        Ok(Some(value))
    }

    fn set_property(&self, name: &str, value: Value) -> Result<bool> {
        ProxyKind::Prototype.assign(&self.class, name, value)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn native_code(name: &str) -> String {
    format!("function {}() {{\n  [native code]\n}}", name)
}

/// Which proxy a shared built-in is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProxyKind {
    Constructor,
    Prototype,
}

impl ProxyKind {
    fn object(self, class: &Arc<ClassDescriptor>) -> ObjectRef {
        match self {
            ProxyKind::Constructor => Arc::new(ConstructorProxy::new(Arc::clone(class))),
            ProxyKind::Prototype => Arc::new(PrototypeProxy::new(Arc::clone(class))),
        }
    }

    fn properties(self, class: &ClassDescriptor) -> &PropertyTable {
        match self {
            ProxyKind::Constructor => class.constructor_properties(),
            ProxyKind::Prototype => class.prototype_properties(),
        }
    }

    fn render(self, class: &ClassDescriptor) -> String {
        match self {
            ProxyKind::Constructor => native_code(class.name()),
            ProxyKind::Prototype => "[object Object]".to_string(),
        }
    }

    /// Read after the proxy's own names missed: built-ins, then getters
    fn lookup(self, class: &Arc<ClassDescriptor>, name: &str) -> Result<Option<Value>> {
        if let Some(method) = self.builtin(class, name) {
            return Ok(Some(Value::Function(method)));
        }
        match self.properties(class).lookup_getter(name) {
            Some(getter) => getter.call(Vec::new()).map(Some),
            None => Ok(None),
        }
    }

    /// Writes reach setters only; proxies store no fields
    fn assign(self, class: &ClassDescriptor, name: &str, value: Value) -> Result<bool> {
        match self.properties(class).lookup_setter(name) {
            Some(setter) => {
                setter.call(vec![value])?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn builtin(self, class: &Arc<ClassDescriptor>, name: &str) -> Option<NativeFunction> {
        let class = Arc::clone(class);
        let kind = self;
        let method = match name {
            "toString" | "toLocaleString" => {
                let rendered = kind.render(&class);
                NativeFunction::new(name, move |_| Ok(Value::String(rendered.clone())))
            }
            "valueOf" => {
                NativeFunction::new(name, move |_| Ok(Value::Object(kind.object(&class))))
            }
            "hasOwnProperty" => NativeFunction::new(name, move |args| {
                let prop = string_arg(&args, 0, "hasOwnProperty")?;
                let found = matches!(kind.object(&class).get_property(&prop), Ok(Some(_)));
                Ok(Value::Boolean(found))
            }),
            "isPrototypeOf" => NativeFunction::new(name, |_| {
                Err(Error::NotSupported("isPrototypeOf".to_string()))
            }),
            "watch" => NativeFunction::new(name, move |args| {
                let prop = string_arg(&args, 0, "watch")?;
                let handler = function_arg(&args, 1, "watch")?;
                kind.properties(&class).watch(&prop, handler);
                Ok(Value::Undefined)
            }),
            "unwatch" => NativeFunction::new(name, move |args| {
                let prop = string_arg(&args, 0, "unwatch")?;
                match kind.properties(&class).unwatch(&prop) {
                    Some(_) => Ok(Value::Undefined),
                    None => Err(Error::Attribute(prop)),
                }
            }),
            "__defineGetter__" => NativeFunction::new(name, move |args| {
                let prop = string_arg(&args, 0, "__defineGetter__")?;
                let getter = function_arg(&args, 1, "__defineGetter__")?;
                kind.properties(&class).define_getter(&prop, getter);
                Ok(Value::Undefined)
            }),
            "__defineSetter__" => NativeFunction::new(name, move |args| {
                let prop = string_arg(&args, 0, "__defineSetter__")?;
                let setter = function_arg(&args, 1, "__defineSetter__")?;
                kind.properties(&class).define_setter(&prop, setter);
                Ok(Value::Undefined)
            }),
            "__lookupGetter__" => NativeFunction::new(name, move |args| {
                let prop = string_arg(&args, 0, "__lookupGetter__")?;
                Ok(kind
                    .properties(&class)
                    .lookup_getter(&prop)
                    .map(Value::Function)
                    .unwrap_or(Value::Undefined))
            }),
            "__lookupSetter__" => NativeFunction::new(name, move |args| {
                let prop = string_arg(&args, 0, "__lookupSetter__")?;
                Ok(kind
                    .properties(&class)
                    .lookup_setter(&prop)
                    .map(Value::Function)
                    .unwrap_or(Value::Undefined))
            }),
            _ => return None,
        };
        Some(method)
    }
}
