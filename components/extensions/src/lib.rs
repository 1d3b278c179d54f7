//! Script extensions for the engine bridge
//!
//! An extension is a named piece of script source, optionally backed by
//! host functions for the `native function NAME();` declarations it
//! contains. Extensions live in an [`ExtensionRegistry`]; a context loads
//! the ones it names plus every auto-enabled one, dependencies first.
//!
//! # Example
//!
//! ```
//! use core_types::{NativeFunction, Value};
//! use extensions::{Extension, ExtensionRegistry, NativeCallback};
//!
//! let registry = ExtensionRegistry::new();
//! let ext = registry
//!     .create(
//!         Extension::builder("hello/native", "native function hello();")
//!             .callback(NativeCallback::resolver(|name| {
//!                 Some(NativeFunction::new(name, |_| Ok(Value::from("hello"))))
//!             })),
//!         true,
//!     )
//!     .unwrap();
//!
//! assert_eq!(registry.names(), vec!["hello/native"]);
//! let hello = ext.resolve_native("hello").unwrap();
//! assert_eq!(hello.call(vec![]).unwrap(), Value::from("hello"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod extension;
pub mod registry;

pub use extension::{Extension, ExtensionBuilder, NativeCallback, NativeResolver};
pub use registry::{ExtensionEntry, ExtensionRegistry};
