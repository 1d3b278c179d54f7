//! Host class registration.
//!
//! A host class opts into script-style property access by registering a
//! [`ClassDescriptor`]: its script-visible name plus the factory used when
//! script code invokes the synthesized constructor.

use std::fmt;
use std::sync::Arc;

use core_types::{Result, Value};

use crate::object::ScriptObject;
use crate::property_table::PropertyTable;

/// Construction callback of a host class.
///
/// Receives the class itself so that factories can build instances bound to
/// the same descriptor.
pub type ClassFactory = dyn Fn(&Arc<ClassDescriptor>, Vec<Value>) -> Result<Value> + Send + Sync;

/// Name and construction factory of a host class.
///
/// # Examples
///
/// ```
/// use object_model::ClassDescriptor;
///
/// let point = ClassDescriptor::plain("Point");
/// let instance = point.instantiate();
///
/// assert_eq!(instance.to_string(), "[object Point]");
/// ```
pub struct ClassDescriptor {
    name: String,
    factory: Arc<ClassFactory>,
    constructor_properties: PropertyTable,
    prototype_properties: PropertyTable,
}

impl ClassDescriptor {
    /// Register a class with a host-supplied factory
    pub fn new<F>(name: impl Into<String>, factory: F) -> Arc<Self>
    where
        F: Fn(&Arc<ClassDescriptor>, Vec<Value>) -> Result<Value> + Send + Sync + 'static,
    {
        Arc::new(Self {
            name: name.into(),
            factory: Arc::new(factory),
            constructor_properties: PropertyTable::new(),
            prototype_properties: PropertyTable::new(),
        })
    }

    /// Register a class whose constructor builds empty instances.
    ///
    /// Positional constructor arguments are ignored.
    pub fn plain(name: impl Into<String>) -> Arc<Self> {
        Self::new(name, |class, _args| Ok(Value::Object(class.instantiate())))
    }

    /// Script-visible class name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the class factory with constructor arguments
    pub fn construct(self: &Arc<Self>, args: Vec<Value>) -> Result<Value> {
        (self.factory)(self, args)
    }

    /// Accessors and watch-points of the class's constructor proxy.
    ///
    /// Proxies are synthesized on every read, so their tables live here.
    pub fn constructor_properties(&self) -> &PropertyTable {
        &self.constructor_properties
    }

    /// Accessors and watch-points of the class's prototype proxy
    pub fn prototype_properties(&self) -> &PropertyTable {
        &self.prototype_properties
    }

    /// Build an empty instance bound to this class
    pub fn instantiate(self: &Arc<Self>) -> Arc<ScriptObject> {
        ScriptObject::new(Arc::clone(self))
    }
}

impl fmt::Debug for ClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDescriptor")
            .field("name", &self.name)
            .finish()
    }
}
