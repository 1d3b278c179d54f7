//! Host-side representation of script values.
//!
//! The engine owns marshalling between its own heap and these values; this
//! module only defines the shapes the bridge layer manipulates: primitives,
//! arrays, native functions and host objects.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};

/// Signature of a host function callable from script code.
pub type NativeFn = dyn Fn(Vec<Value>) -> Result<Value> + Send + Sync;

/// A named host function exposed to script code.
///
/// # Examples
///
/// ```
/// use core_types::{NativeFunction, Value};
///
/// let hello = NativeFunction::new("hello", |args| {
///     Ok(Value::String(format!("hello {}", args[0])))
/// });
///
/// let result = hello.call(vec![Value::from("world")]).unwrap();
/// assert_eq!(result, Value::from("hello world"));
/// ```
#[derive(Clone)]
pub struct NativeFunction {
    name: String,
    func: Arc<NativeFn>,
}

impl NativeFunction {
    /// Wrap a closure as a named native function
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// The script-visible name of the function
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the function with already-marshalled arguments
    pub fn call(&self, args: Vec<Value>) -> Result<Value> {
        (self.func)(args)
    }

    /// Whether both handles share the same underlying closure
    pub fn ptr_eq(&self, other: &NativeFunction) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NativeFunction").field(&self.name).finish()
    }
}

/// Explicit property-access interface for host objects.
///
/// Script engines reach host objects only through this trait: a read either
/// resolves to a value or misses, and a write is either accepted or refused.
/// There is no ambient attribute interception. `Err` is reserved for real
/// failures raised by accessor code, never for a plain miss.
pub trait HostObject: Send + Sync {
    /// Class name used for `[object <ClassName>]` renderings
    fn class_name(&self) -> &str;

    /// Resolve a property read; `Ok(None)` is a lookup miss
    fn get_property(&self, name: &str) -> Result<Option<Value>>;

    /// Perform a property write; `Ok(false)` means the write was refused
    fn set_property(&self, name: &str, value: Value) -> Result<bool>;

    /// Invoke the object as a function
    fn call(&self, _args: Vec<Value>) -> Result<Value> {
        Err(Error::NotSupported(format!(
            "calling [object {}]",
            self.class_name()
        )))
    }

    /// Access to the concrete type for downcasting
    fn as_any(&self) -> &dyn Any;
}

/// Shared handle to a host object
pub type ObjectRef = Arc<dyn HostObject>;

/// A script value as seen from the host side.
///
/// # Examples
///
/// ```
/// use core_types::Value;
///
/// assert!(!Value::Undefined.is_truthy());
/// assert!(Value::Number(1.0).is_truthy());
/// assert_eq!(Value::Null.type_of(), "object");
/// ```
#[derive(Clone)]
pub enum Value {
    /// Script `undefined`
    Undefined,
    /// Script `null`
    Null,
    /// Boolean primitive
    Boolean(bool),
    /// Number primitive
    Number(f64),
    /// String primitive
    String(String),
    /// Array of values
    Array(Vec<Value>),
    /// Host function callable from script
    Function(NativeFunction),
    /// Host object answering property access
    Object(ObjectRef),
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "Undefined"),
            Value::Null => write!(f, "Null"),
            Value::Boolean(b) => f.debug_tuple("Boolean").field(b).finish(),
            Value::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Value::String(s) => f.debug_tuple("String").field(s).finish(),
            Value::Array(items) => f.debug_tuple("Array").field(items).finish(),
            Value::Function(func) => f.debug_tuple("Function").field(&func.name).finish(),
            Value::Object(obj) => write!(f, "Object([object {}])", obj.class_name()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => same_object(a, b),
            _ => false,
        }
    }
}

/// Identity comparison of two host object handles
pub fn same_object(a: &ObjectRef, b: &ObjectRef) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

impl Value {
    /// Returns whether this value is truthy in script semantics.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Number(n) => !n.is_nan() && *n != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Function(_) | Value::Object(_) => true,
        }
    }

    /// Returns the script `typeof` result for this value.
    ///
    /// ```
    /// use core_types::Value;
    ///
    /// assert_eq!(Value::Undefined.type_of(), "undefined");
    /// assert_eq!(Value::Array(vec![]).type_of(), "object");
    /// ```
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "object",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) | Value::Object(_) => "object",
            Value::Function(_) => "function",
        }
    }

    /// Whether the value is `undefined`
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Whether the value is `null`
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow the string payload, if any
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// The number payload, if any
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The boolean payload, if any
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Borrow the function payload, if any
    pub fn as_function(&self) -> Option<&NativeFunction> {
        match self {
            Value::Function(func) => Some(func),
            _ => None,
        }
    }

    /// Borrow the object handle, if any
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<NativeFunction> for Value {
    fn from(func: NativeFunction) -> Self {
        Value::Function(func)
    }
}

/// String conversion following script `String()` rules for primitives.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => {
                if n.is_nan() {
                    write!(f, "NaN")
                } else if n.is_infinite() {
                    if n.is_sign_positive() {
                        write!(f, "Infinity")
                    } else {
                        write!(f, "-Infinity")
                    }
                } else if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::String(s) => write!(f, "{}", s),
            Value::Array(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "{}", parts.join(","))
            }
            Value::Function(func) => {
                write!(f, "function {}() {{\n  [native code]\n}}", func.name)
            }
            Value::Object(obj) => write!(f, "[object {}]", obj.class_name()),
        }
    }
}
