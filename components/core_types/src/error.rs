//! Error types shared by every bridge component.
//!
//! Lookup misses are not errors at this level: the object model reports
//! them as `Option`, and only the public accessors turn a miss into
//! [`Error::Attribute`]. Everything here is a genuine failure that the
//! caller must see.

use thiserror::Error;

use crate::script_error::ScriptError;

/// Failures raised by the bridge layer.
///
/// # Examples
///
/// ```
/// use core_types::Error;
///
/// let err = Error::state("Context::enter", "lock must be acquired before entering context");
/// assert_eq!(
///     err.to_string(),
///     "Context::enter: lock must be acquired before entering context"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Entry-stack ordering violation (isolate/locker/context misuse)
    #[error("{operation}: {message}")]
    State {
        /// The operation that detected the violation
        operation: &'static str,
        /// What went wrong
        message: String,
    },

    /// Property lookup resolved to nothing
    #[error("attribute not found: {0}")]
    Attribute(String),

    /// A stack trace line matched none of the known frame grammars
    #[error("unrecognized stack trace line {line_number}: {line:?}")]
    ParseInconsistency {
        /// 1-based line number within the trace text
        line_number: usize,
        /// The offending line
        line: String,
    },

    /// A value of the wrong shape was passed to a host method
    #[error("type error: {0}")]
    Type(String),

    /// Intentionally unimplemented capability
    #[error("{0} is not supported")]
    NotSupported(String),

    /// An extension with the same name is already registered
    #[error("extension {0:?} is already registered")]
    DuplicateExtension(String),

    /// An extension name that is not in the registry
    #[error("extension {0:?} is not registered")]
    UnknownExtension(String),

    /// An extension depends on something that is not registered
    #[error("extension {extension:?} depends on unregistered extension {dependency:?}")]
    MissingDependency {
        /// The extension being enabled
        extension: String,
        /// The dependency that could not be found
        dependency: String,
    },

    /// Extension dependencies form a cycle
    #[error("extension {0:?} participates in a dependency cycle")]
    DependencyCycle(String),

    /// The engine failed to execute a script
    #[error(transparent)]
    Script(Box<ScriptError>),

    /// Invalid runtime configuration
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Build an entry-stack state error
    pub fn state(operation: &'static str, message: impl Into<String>) -> Self {
        Error::State {
            operation,
            message: message.into(),
        }
    }

    /// Whether this is an entry-stack state error
    pub fn is_state(&self) -> bool {
        matches!(self, Error::State { .. })
    }
}

impl From<ScriptError> for Error {
    fn from(err: ScriptError) -> Self {
        Error::Script(Box::new(err))
    }
}

/// Result alias used across the bridge crates
pub type Result<T> = std::result::Result<T, Error>;
