//! Script extensions: named source units with optional native hooks.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock};

use core_types::NativeFunction;
use regex::Regex;

static NATIVE_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"native\s+function\s+([A-Za-z_$][A-Za-z0-9_$]*)\s*\(")
        .expect("native declaration pattern is valid")
});

/// Resolver signature: script-visible name to host function
pub type NativeResolver = dyn Fn(&str) -> Option<NativeFunction> + Send + Sync;

/// Maps script-visible native function names to host callables.
///
/// `Resolver` is consulted with each declared name; `Table` answers from a
/// fixed map.
#[derive(Clone)]
pub enum NativeCallback {
    /// Compute the function for a name on demand
    Resolver(Arc<NativeResolver>),
    /// Fixed name to function map
    Table(HashMap<String, NativeFunction>),
}

impl NativeCallback {
    /// Wrap a resolver closure
    pub fn resolver<F>(f: F) -> Self
    where
        F: Fn(&str) -> Option<NativeFunction> + Send + Sync + 'static,
    {
        NativeCallback::Resolver(Arc::new(f))
    }

    /// Build a table keyed by each function's own name
    pub fn table(functions: impl IntoIterator<Item = NativeFunction>) -> Self {
        NativeCallback::Table(
            functions
                .into_iter()
                .map(|f| (f.name().to_string(), f))
                .collect(),
        )
    }

    /// Resolve `name` to a host function
    pub fn resolve(&self, name: &str) -> Option<NativeFunction> {
        match self {
            NativeCallback::Resolver(f) => f(name),
            NativeCallback::Table(map) => map.get(name).cloned(),
        }
    }
}

impl fmt::Debug for NativeCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeCallback::Resolver(_) => write!(f, "Resolver(..)"),
            NativeCallback::Table(map) => {
                let mut names: Vec<&String> = map.keys().collect();
                names.sort();
                f.debug_tuple("Table").field(&names).finish()
            }
        }
    }
}

/// A named unit of script source loaded into contexts that enable it.
///
/// `registered` flips once the extension enters a registry. `auto_enable`
/// is read when a context is built, so toggling it only affects contexts
/// created afterwards.
///
/// # Examples
///
/// ```
/// use core_types::{NativeFunction, Value};
/// use extensions::{Extension, NativeCallback};
///
/// let ext = Extension::builder("hello/native", "native function hello();")
///     .callback(NativeCallback::table([NativeFunction::new("hello", |_| {
///         Ok(Value::from("hi"))
///     })]))
///     .build();
///
/// assert_eq!(ext.native_declarations(), vec!["hello"]);
/// assert!(ext.resolve_native("hello").is_some());
/// assert!(!ext.is_registered());
/// assert!(!ext.auto_enable());
/// ```
pub struct Extension {
    name: String,
    source: String,
    callback: Option<NativeCallback>,
    dependencies: Vec<String>,
    registered: AtomicBool,
    auto_enable: AtomicBool,
}

impl Extension {
    /// Start building an extension
    pub fn builder(name: impl Into<String>, source: impl Into<String>) -> ExtensionBuilder {
        ExtensionBuilder {
            name: name.into(),
            source: source.into(),
            callback: None,
            dependencies: Vec::new(),
        }
    }

    /// Unique registry name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Script source loaded when the extension is enabled
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Names of extensions that must load first
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// Whether a native callback is attached
    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    /// Whether the extension has been registered
    pub fn is_registered(&self) -> bool {
        self.registered.load(Ordering::Acquire)
    }

    pub(crate) fn mark_registered(&self) {
        self.registered.store(true, Ordering::Release);
    }

    /// Whether contexts enable this extension without naming it
    pub fn auto_enable(&self) -> bool {
        self.auto_enable.load(Ordering::Acquire)
    }

    /// Change the auto-enable flag for contexts created from now on
    pub fn set_auto_enable(&self, enabled: bool) {
        self.auto_enable.store(enabled, Ordering::Release);
    }

    /// Names declared in the source as `native function NAME(...)`
    pub fn native_declarations(&self) -> Vec<String> {
        NATIVE_DECLARATION
            .captures_iter(&self.source)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Resolve a declared native function through the callback
    pub fn resolve_native(&self, name: &str) -> Option<NativeFunction> {
        let callback = self.callback.as_ref()?;
        if !self.native_declarations().iter().any(|declared| declared == name) {
            return None;
        }
        callback.resolve(name)
    }
}

impl fmt::Debug for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extension")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .field("registered", &self.is_registered())
            .field("auto_enable", &self.auto_enable())
            .finish()
    }
}

/// Builder for [`Extension`]
#[derive(Debug)]
pub struct ExtensionBuilder {
    name: String,
    source: String,
    callback: Option<NativeCallback>,
    dependencies: Vec<String>,
}

impl ExtensionBuilder {
    /// Attach the native callback
    pub fn callback(mut self, callback: NativeCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Add one dependency
    pub fn dependency(mut self, name: impl Into<String>) -> Self {
        self.dependencies.push(name.into());
        self
    }

    /// Add several dependencies
    pub fn dependencies<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies.extend(names.into_iter().map(Into::into));
        self
    }

    /// Finish the extension; it starts unregistered with auto-enable off
    pub fn build(self) -> Arc<Extension> {
        Arc::new(Extension {
            name: self.name,
            source: self.source,
            callback: self.callback,
            dependencies: self.dependencies,
            registered: AtomicBool::new(false),
            auto_enable: AtomicBool::new(false),
        })
    }
}
