//! Process-wide extension registry and enable-set resolution.

use std::collections::HashSet;
use std::sync::Arc;

use core_types::{Error, Result};
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::extension::{Extension, ExtensionBuilder};

/// Snapshot of one registry entry, as listed to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionEntry {
    /// Registry name
    pub name: String,
    /// Script source
    pub source: String,
    /// Auto-enable flag at the time of listing
    pub auto_enable: bool,
    /// Declared dependencies
    pub dependencies: Vec<String>,
}

/// Registered extensions, kept in registration order.
///
/// Registration is append-only; names are unique.
///
/// # Examples
///
/// ```
/// use extensions::{Extension, ExtensionRegistry};
///
/// let registry = ExtensionRegistry::new();
/// let base = registry
///     .create(Extension::builder("base", "var base = 1;"), true)
///     .unwrap();
/// registry
///     .create(Extension::builder("child", "var child = base + 1;").dependency("base"), true)
///     .unwrap();
///
/// assert!(base.is_registered());
/// let order = registry.resolve(&["child"]).unwrap();
/// let names: Vec<&str> = order.iter().map(|e| e.name()).collect();
/// assert_eq!(names, vec!["base", "child"]);
/// ```
#[derive(Debug, Default)]
pub struct ExtensionRegistry {
    entries: RwLock<Vec<Arc<Extension>>>,
}

impl ExtensionRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an extension and register it when `auto_register` is set
    pub fn create(&self, builder: ExtensionBuilder, auto_register: bool) -> Result<Arc<Extension>> {
        let extension = builder.build();
        if auto_register {
            self.register(&extension)?;
        }
        Ok(extension)
    }

    /// Add an extension to the registry.
    ///
    /// Fails with [`Error::DuplicateExtension`] when the name is taken.
    pub fn register(&self, extension: &Arc<Extension>) -> Result<()> {
        let mut entries = self.entries.write();
        if entries.iter().any(|e| e.name() == extension.name()) {
            return Err(Error::DuplicateExtension(extension.name().to_string()));
        }
        entries.push(Arc::clone(extension));
        extension.mark_registered();
        info!(
            extension = extension.name(),
            dependencies = ?extension.dependencies(),
            "registered extension"
        );
        Ok(())
    }

    /// Look up an extension by name
    pub fn get(&self, name: &str) -> Option<Arc<Extension>> {
        self.entries
            .read()
            .iter()
            .find(|e| e.name() == name)
            .cloned()
    }

    /// Registered names in registration order
    pub fn names(&self) -> Vec<String> {
        self.entries
            .read()
            .iter()
            .map(|e| e.name().to_string())
            .collect()
    }

    /// Snapshot of every entry
    pub fn entries(&self) -> Vec<ExtensionEntry> {
        self.entries
            .read()
            .iter()
            .map(|e| ExtensionEntry {
                name: e.name().to_string(),
                source: e.source().to_string(),
                auto_enable: e.auto_enable(),
                dependencies: e.dependencies().to_vec(),
            })
            .collect()
    }

    /// Number of registered extensions
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Compute the load order for a context.
    ///
    /// The enabled set is `requested` followed by every auto-enabled
    /// extension. Dependencies precede their dependents and each extension
    /// appears once.
    pub fn resolve<S: AsRef<str>>(&self, requested: &[S]) -> Result<Vec<Arc<Extension>>> {
        let entries = self.entries.read().clone();
        let find = |name: &str| entries.iter().find(|e| e.name() == name).cloned();

        let mut roots = Vec::with_capacity(requested.len());
        for name in requested {
            let name = name.as_ref();
            roots.push(find(name).ok_or_else(|| Error::UnknownExtension(name.to_string()))?);
        }
        roots.extend(entries.iter().filter(|e| e.auto_enable()).cloned());

        let mut resolver = Resolver {
            find: &find,
            visiting: Vec::new(),
            done: HashSet::new(),
            order: Vec::new(),
        };
        for root in roots {
            resolver.visit(root)?;
        }

        debug!(
            order = ?resolver.order.iter().map(|e| e.name()).collect::<Vec<_>>(),
            "resolved extensions"
        );
        Ok(resolver.order)
    }
}

struct Resolver<'a, F: Fn(&str) -> Option<Arc<Extension>>> {
    find: &'a F,
    visiting: Vec<String>,
    done: HashSet<String>,
    order: Vec<Arc<Extension>>,
}

impl<F: Fn(&str) -> Option<Arc<Extension>>> Resolver<'_, F> {
    fn visit(&mut self, extension: Arc<Extension>) -> Result<()> {
        if self.done.contains(extension.name()) {
            return Ok(());
        }
        if self.visiting.iter().any(|n| n == extension.name()) {
            return Err(Error::DependencyCycle(extension.name().to_string()));
        }

        self.visiting.push(extension.name().to_string());
        for dependency in extension.dependencies() {
            let dep = (self.find)(dependency.as_str()).ok_or_else(|| Error::MissingDependency {
                extension: extension.name().to_string(),
                dependency: dependency.clone(),
            })?;
            self.visit(dep)?;
        }
        self.visiting.pop();

        self.done.insert(extension.name().to_string());
        self.order.push(extension);
        Ok(())
    }
}
