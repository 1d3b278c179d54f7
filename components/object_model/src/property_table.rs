//! Per-instance accessor descriptors and watch-points.
//!
//! Accessors are stored per object instance, keyed by property name. A
//! descriptor holds an independent getter and setter half; defining one
//! half never disturbs the other. Watch-points live in a separate table and
//! are registration-only: interception of assignments belongs to the
//! engine's property interceptor.

use std::collections::HashMap;

use core_types::NativeFunction;
use parking_lot::RwLock;

/// Getter/setter pair for one property
#[derive(Debug, Clone, Default)]
pub struct PropertyDescriptor {
    /// Called with no arguments on read
    pub getter: Option<NativeFunction>,
    /// Called with the new value on write
    pub setter: Option<NativeFunction>,
}

impl PropertyDescriptor {
    /// Whether neither half is installed
    pub fn is_empty(&self) -> bool {
        self.getter.is_none() && self.setter.is_none()
    }
}

/// Descriptor and watch-point tables of one object.
///
/// # Examples
///
/// ```
/// use core_types::{NativeFunction, Value};
/// use object_model::PropertyTable;
///
/// let table = PropertyTable::new();
/// table.define_getter("x", NativeFunction::new("get x", |_| Ok(Value::from(1))));
///
/// assert!(table.lookup_getter("x").is_some());
/// assert!(table.lookup_setter("x").is_none());
/// ```
#[derive(Debug, Default)]
pub struct PropertyTable {
    descriptors: RwLock<HashMap<String, PropertyDescriptor>>,
    watchpoints: RwLock<HashMap<String, NativeFunction>>,
}

impl PropertyTable {
    /// Create empty tables
    pub fn new() -> Self {
        Self::default()
    }

    /// Install or replace the getter half of `name`
    pub fn define_getter(&self, name: &str, getter: NativeFunction) {
        self.descriptors
            .write()
            .entry(name.to_string())
            .or_default()
            .getter = Some(getter);
    }

    /// Install or replace the setter half of `name`
    pub fn define_setter(&self, name: &str, setter: NativeFunction) {
        self.descriptors
            .write()
            .entry(name.to_string())
            .or_default()
            .setter = Some(setter);
    }

    /// The getter bound to `name`, if any
    pub fn lookup_getter(&self, name: &str) -> Option<NativeFunction> {
        self.descriptors
            .read()
            .get(name)
            .and_then(|d| d.getter.clone())
    }

    /// The setter bound to `name`, if any
    pub fn lookup_setter(&self, name: &str) -> Option<NativeFunction> {
        self.descriptors
            .read()
            .get(name)
            .and_then(|d| d.setter.clone())
    }

    /// Snapshot of the descriptor for `name`
    pub fn descriptor(&self, name: &str) -> Option<PropertyDescriptor> {
        self.descriptors.read().get(name).cloned()
    }

    /// Drop both accessor halves of `name`
    pub fn remove(&self, name: &str) -> Option<PropertyDescriptor> {
        self.descriptors.write().remove(name)
    }

    /// Names that have at least one accessor half
    pub fn accessor_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .descriptors
            .read()
            .iter()
            .filter(|(_, d)| !d.is_empty())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Register `handler` for assignments to `prop`, replacing any previous one
    pub fn watch(&self, prop: &str, handler: NativeFunction) {
        self.watchpoints.write().insert(prop.to_string(), handler);
    }

    /// Remove the watch-point on `prop`, returning its handler
    pub fn unwatch(&self, prop: &str) -> Option<NativeFunction> {
        self.watchpoints.write().remove(prop)
    }

    /// The handler watching `prop`, if any
    pub fn watch_handler(&self, prop: &str) -> Option<NativeFunction> {
        self.watchpoints.read().get(prop).cloned()
    }

    /// Names of all watched properties
    pub fn watched(&self) -> Vec<String> {
        let mut names: Vec<String> = self.watchpoints.read().keys().cloned().collect();
        names.sort();
        names
    }
}
