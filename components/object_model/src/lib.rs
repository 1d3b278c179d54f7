//! Script-style property access for host objects
//!
//! This crate lets host objects answer to script property access without
//! rewriting their class per script binding:
//! - Per-instance getter/setter descriptor tables
//! - Synthesized constructor and prototype proxies
//! - Watch-point registration
//! - The built-in methods every script object exposes
//!
//! # Example
//!
//! ```
//! use core_types::{NativeFunction, Value};
//! use object_model::ClassDescriptor;
//!
//! let foo = ClassDescriptor::plain("Foo");
//! let obj = foo.instantiate();
//!
//! obj.define_getter("x", NativeFunction::new("get x", |_| Ok(Value::from(1))));
//! assert_eq!(obj.get("x").unwrap(), Value::from(1));
//!
//! assert_eq!(obj.constructor().to_string(), "function Foo() {\n  [native code]\n}");
//! assert_eq!(obj.prototype().constructor().name(), "Foo");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod attributes;
pub mod class;
pub mod object;
pub mod property_table;
pub mod proxy;

// Re-export main types at crate root
pub use attributes::PropertyAttributes;
pub use class::{ClassDescriptor, ClassFactory};
pub use object::{ScriptObject, BUILTIN_METHODS};
pub use property_table::{PropertyDescriptor, PropertyTable};
pub use proxy::{ConstructorProxy, PrototypeProxy};
