//! Source origin and stack frame types for script error tracking.

use serde::Serialize;
use std::fmt;

/// Where a compiled script came from.
///
/// Absent line/column offsets mean the engine's defaults apply.
///
/// # Examples
///
/// ```
/// use core_types::ScriptOrigin;
///
/// let origin = ScriptOrigin::named("main.js").at(10, 4);
/// assert_eq!(origin.name.as_deref(), Some("main.js"));
/// assert_eq!(origin.line, Some(10));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScriptOrigin {
    /// Resource name reported in stack traces
    pub name: Option<String>,
    /// Line offset of the first source line
    pub line: Option<u32>,
    /// Column offset of the first source line
    pub column: Option<u32>,
}

impl ScriptOrigin {
    /// Origin with a resource name and default offsets
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            line: None,
            column: None,
        }
    }

    /// Set line and column offsets
    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }
}

/// One entry of a parsed script call stack.
///
/// Every component is optional: frames for native code carry no position,
/// and top-level frames carry no function name. An absent line is distinct
/// from line zero.
///
/// # Examples
///
/// ```
/// use core_types::StackFrame;
///
/// let frame = StackFrame::new(Some("foo"), Some("bar.js"), Some(10), Some(5));
/// assert_eq!(frame.to_string(), "foo (bar.js:10:5)");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct StackFrame {
    /// Name of the function, or None for top-level code
    pub function_name: Option<String>,
    /// Script resource name
    pub file_name: Option<String>,
    /// Line number, when reported
    pub line: Option<u64>,
    /// Column number, when reported
    pub column: Option<u64>,
}

impl StackFrame {
    /// Build a frame from borrowed parts
    pub fn new(
        function_name: Option<&str>,
        file_name: Option<&str>,
        line: Option<u64>,
        column: Option<u64>,
    ) -> Self {
        Self {
            function_name: function_name.map(str::to_string),
            file_name: file_name.map(str::to_string),
            line,
            column,
        }
    }
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = self.file_name.as_deref().unwrap_or("<unknown>");
        let mut location = file.to_string();
        if let Some(line) = self.line {
            location.push_str(&format!(":{}", line));
            if let Some(column) = self.column {
                location.push_str(&format!(":{}", column));
            }
        }

        match &self.function_name {
            Some(name) => write!(f, "{} ({})", name, location),
            None => write!(f, "{}", location),
        }
    }
}
