//! Thread-safety and scoping bridge for an embedded script engine
//!
//! The engine tolerates one active thread per isolate and one current
//! context per entry stack. This crate enforces that discipline:
//! - [`Runtime`] - process-scoped state, initialized once
//! - [`Isolate`] - execution universes entered per thread
//! - [`Locker`] / [`Unlocker`] - reentrant permits for the engine lock
//! - [`Context`] - execution scopes with a global object and extensions
//! - [`Engine`] - the seam to the engine that actually runs scripts
//!
//! Every enter has a matching leave; the `scope()` guards leave on drop.
//!
//! # Example
//!
//! ```
//! # use bridge::testing::NullEngine;
//! use bridge::{Runtime, RuntimeConfig};
//! use core_types::Value;
//!
//! let runtime = Runtime::initialize(RuntimeConfig::default(), NullEngine).unwrap();
//!
//! let locker = runtime.locker();
//! let lock = locker.scope().unwrap();
//! let context = runtime.context().build().unwrap();
//! {
//!     let scope = context.scope().unwrap();
//!     assert_eq!(scope.eval("1 + 1").unwrap(), Value::Undefined);
//! }
//! lock.finish().unwrap();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod context;
pub mod engine;
mod entry_stack;
pub mod isolate;
mod lock;
pub mod locker;
pub mod platform;
pub mod runtime;
pub mod testing;

// Re-export main types at crate root
pub use config::RuntimeConfig;
pub use context::{Context, ContextBuilder, ContextId, ContextScope};
pub use engine::{Engine, ExecutionScope, Script, StackTraceOptions};
pub use isolate::{Isolate, IsolateId, IsolateScope};
pub use locker::{Locker, LockerScope, Unlocker, UnlockerScope};
pub use platform::Platform;
pub use runtime::{Runtime, Versions};
