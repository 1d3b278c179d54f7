//! Engine execution failures as seen by the host.

use std::fmt;
use std::sync::OnceLock;

use crate::error::Result;
use crate::source::{ScriptOrigin, StackFrame};
use crate::stack_trace::StackTraceParser;

/// A failure raised by the engine while executing script code.
///
/// The raw engine data (error name, message, rendered stack text, origin)
/// is kept as-is. Parsed frames are derived on first request and cached.
///
/// # Examples
///
/// ```
/// use core_types::ScriptError;
///
/// let err = ScriptError::new("Error", "boom")
///     .with_stack_trace("Error: boom\n    at foo (bar.js:10:5)");
///
/// let frames = err.frames().unwrap();
/// assert_eq!(frames[0].function_name.as_deref(), Some("foo"));
/// ```
#[derive(Debug, Clone)]
pub struct ScriptError {
    name: String,
    message: String,
    stack_trace: Option<String>,
    origin: Option<ScriptOrigin>,
    frames: OnceLock<Result<Vec<StackFrame>>>,
}

impl ScriptError {
    /// Create an error from the engine's error name and message
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            stack_trace: None,
            origin: None,
            frames: OnceLock::new(),
        }
    }

    /// Attach the engine-rendered stack trace text
    pub fn with_stack_trace(mut self, text: impl Into<String>) -> Self {
        self.stack_trace = Some(text.into());
        self.frames = OnceLock::new();
        self
    }

    /// Attach the origin of the failing script
    pub fn with_origin(mut self, origin: ScriptOrigin) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Error constructor name (`TypeError`, `ReferenceError`, ...)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Raw stack trace text, if the engine produced one
    pub fn stack_trace(&self) -> Option<&str> {
        self.stack_trace.as_deref()
    }

    /// Origin of the failing script, if known
    pub fn origin(&self) -> Option<&ScriptOrigin> {
        self.origin.as_ref()
    }

    /// Parsed call stack, derived lazily from the trace text
    pub fn frames(&self) -> Result<&[StackFrame]> {
        let parsed = self.frames.get_or_init(|| match &self.stack_trace {
            Some(text) => StackTraceParser::parse(text),
            None => Ok(Vec::new()),
        });

        match parsed {
            Ok(frames) => Ok(frames),
            Err(err) => Err(err.clone()),
        }
    }
}

impl PartialEq for ScriptError {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.message == other.message
            && self.stack_trace == other.stack_trace
            && self.origin == other.origin
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.message)?;
        if let Some(origin) = &self.origin {
            if let Some(name) = &origin.name {
                write!(f, " ({}", name)?;
                if let Some(line) = origin.line {
                    write!(f, " @ {}", line)?;
                }
                write!(f, ")")?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ScriptError {}
