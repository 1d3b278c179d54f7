//! The boundary with the script engine.
//!
//! The bridge never parses or runs script code itself. An [`Engine`]
//! implementation does that work; the bridge decides *when* it may be
//! asked to, and with which global object and extensions.

use std::fmt;
use std::ops::BitOr;
use std::sync::Arc;

use core_types::{NativeFunction, ObjectRef, ScriptError, ScriptOrigin, StackFrame, Value};
use extensions::Extension;
use serde::Deserialize;

use crate::context::ContextId;
use crate::isolate::IsolateId;

/// Frame details requested when capturing a stack trace.
///
/// The bit values are the engine's own; the bridge only forwards them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct StackTraceOptions(u32);

impl StackTraceOptions {
    /// Line numbers
    pub const LINE_NUMBER: Self = Self(1);
    /// Column offsets (implies line numbers)
    pub const COLUMN_OFFSET: Self = Self(1 << 1 | 1);
    /// Script names
    pub const SCRIPT_NAME: Self = Self(1 << 2);
    /// Function names
    pub const FUNCTION_NAME: Self = Self(1 << 3);
    /// Whether the frame is inside eval
    pub const IS_EVAL: Self = Self(1 << 4);
    /// Whether the frame is a constructor call
    pub const IS_CONSTRUCTOR: Self = Self(1 << 5);
    /// Script name or `sourceURL`
    pub const SCRIPT_NAME_OR_SOURCE_URL: Self = Self(1 << 6);
    /// Line, column, script and function name
    pub const OVERVIEW: Self = Self(1 | 3 | 1 << 2 | 1 << 3);
    /// Everything in [`OVERVIEW`](Self::OVERVIEW) plus eval, constructor and source URL
    pub const DETAILED: Self = Self(Self::OVERVIEW.0 | 1 << 4 | 1 << 5 | 1 << 6);

    /// Raw flag bits
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Flags from raw bits
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Whether every flag in `other` is set
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for StackTraceOptions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl Default for StackTraceOptions {
    fn default() -> Self {
        Self::OVERVIEW
    }
}

/// Source text ready to run in a context.
///
/// Produced by [`Context::compile`](crate::Context::compile); the engine
/// has already accepted the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    source: String,
    origin: Option<ScriptOrigin>,
}

impl Script {
    /// Wrap source text
    pub fn new(source: impl Into<String>, origin: Option<ScriptOrigin>) -> Self {
        Self {
            source: source.into(),
            origin,
        }
    }

    /// Source text
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Where the source came from
    pub fn origin(&self) -> Option<&ScriptOrigin> {
        self.origin.as_ref()
    }

    /// Run in `context`, which must be entered on this thread
    pub fn run(&self, context: &crate::Context<'_>) -> core_types::Result<Value> {
        context.run(self)
    }
}

/// What the engine sees of the context a script runs in.
pub struct ExecutionScope<'s> {
    pub(crate) isolate: IsolateId,
    pub(crate) context: ContextId,
    pub(crate) global: &'s ObjectRef,
    pub(crate) extensions: &'s [Arc<Extension>],
}

impl<'s> ExecutionScope<'s> {
    /// Isolate the context belongs to
    pub fn isolate(&self) -> IsolateId {
        self.isolate
    }

    /// The running context
    pub fn context(&self) -> ContextId {
        self.context
    }

    /// The script global object
    pub fn global(&self) -> &'s ObjectRef {
        self.global
    }

    /// Enabled extensions in load order
    pub fn extensions(&self) -> &'s [Arc<Extension>] {
        self.extensions
    }

    /// Resolve a native function declared by an enabled extension
    pub fn native_function(&self, name: &str) -> Option<NativeFunction> {
        resolve_native(self.extensions, name)
    }
}

impl fmt::Debug for ExecutionScope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionScope")
            .field("isolate", &self.isolate)
            .field("context", &self.context)
            .field("extensions", &self.extensions.len())
            .finish()
    }
}

pub(crate) fn resolve_native(extensions: &[Arc<Extension>], name: &str) -> Option<NativeFunction> {
    extensions.iter().find_map(|ext| ext.resolve_native(name))
}

/// A script engine driven by the bridge.
///
/// Only [`execute`](Engine::execute) and the version accessors are
/// required; the remaining hooks default to no-ops.
pub trait Engine: Send + Sync {
    /// Run a script and return its completion value
    fn execute(&self, scope: &ExecutionScope<'_>, script: &Script) -> Result<Value, ScriptError>;

    /// Check that a script is acceptable before it is run
    fn compile(&self, _script: &Script) -> Result<(), ScriptError> {
        Ok(())
    }

    /// Engine version text, `major.minor.patch` with an optional suffix
    fn version(&self) -> String;

    /// Companion library version packed into one integer
    fn packed_library_version(&self) -> u32;

    /// Capture the stack of the script currently running in `isolate`
    fn capture_stack_trace(
        &self,
        _isolate: IsolateId,
        _frame_limit: usize,
        _options: StackTraceOptions,
    ) -> Vec<StackFrame> {
        Vec::new()
    }

    /// Apply an engine flag string
    fn set_flags(&self, _flags: &str) {}

    /// Limit the engine stack
    fn set_stack_limit(&self, _limit: usize) {}

    /// Stop every running script
    fn terminate_execution(&self) {}

    /// Whether the engine can no longer run scripts
    fn is_dead(&self) -> bool {
        false
    }

    /// Hint that the host is short on memory
    fn low_memory_notification(&self) {}
}

impl<E: Engine + ?Sized> Engine for Arc<E> {
    fn execute(&self, scope: &ExecutionScope<'_>, script: &Script) -> Result<Value, ScriptError> {
        (**self).execute(scope, script)
    }

    fn compile(&self, script: &Script) -> Result<(), ScriptError> {
        (**self).compile(script)
    }

    fn version(&self) -> String {
        (**self).version()
    }

    fn packed_library_version(&self) -> u32 {
        (**self).packed_library_version()
    }

    fn capture_stack_trace(
        &self,
        isolate: IsolateId,
        frame_limit: usize,
        options: StackTraceOptions,
    ) -> Vec<StackFrame> {
        (**self).capture_stack_trace(isolate, frame_limit, options)
    }

    fn set_flags(&self, flags: &str) {
        (**self).set_flags(flags)
    }

    fn set_stack_limit(&self, limit: usize) {
        (**self).set_stack_limit(limit)
    }

    fn terminate_execution(&self) {
        (**self).terminate_execution()
    }

    fn is_dead(&self) -> bool {
        (**self).is_dead()
    }

    fn low_memory_notification(&self) {
        (**self).low_memory_notification()
    }
}
