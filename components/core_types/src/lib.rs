//! Core value, error and stack-trace types for the engine bridge.
//!
//! This crate provides the foundational types shared by every bridge
//! component: the host-side view of script values, the error taxonomy,
//! source origins, and the stack trace text parser.
//!
//! # Overview
//!
//! - [`Value`] - Script values as seen from the host
//! - [`HostObject`] - Explicit property-access interface for host objects
//! - [`Error`] - Bridge failures (state, attribute, parse, ...)
//! - [`ScriptError`] - Engine execution failures with lazily parsed frames
//! - [`StackTraceParser`] - Trace text to [`StackFrame`] conversion
//! - [`Version`] - Engine and companion library versions
//!
//! # Examples
//!
//! ```
//! use core_types::{ScriptError, StackFrame};
//!
//! let err = ScriptError::new("Error", "boom")
//!     .with_stack_trace("Error: boom\n    at bar.js:3");
//!
//! assert_eq!(
//!     err.frames().unwrap(),
//!     &[StackFrame::new(None, Some("bar.js"), Some(3), None)]
//! );
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod script_error;
mod source;
mod stack_trace;
mod value;
mod version;

pub use error::{Error, Result};
pub use script_error::ScriptError;
pub use source::{ScriptOrigin, StackFrame};
pub use stack_trace::StackTraceParser;
pub use value::{same_object, HostObject, NativeFn, NativeFunction, ObjectRef, Value};
pub use version::Version;
