//! Runtime configuration

use core_types::{Error, Result};
use serde::Deserialize;

use crate::engine::StackTraceOptions;

/// Settings applied by [`Runtime::initialize`](crate::Runtime::initialize).
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// use bridge::RuntimeConfig;
///
/// let config = RuntimeConfig::from_json(r#"{ "locking": true }"#).unwrap();
/// assert!(config.locking);
/// assert_eq!(config.stack_trace_frame_limit, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Start with locking mode already active
    pub locking: bool,
    /// Flag string forwarded to the engine at startup
    pub engine_flags: String,
    /// Engine stack limit, when one should be set
    pub stack_limit: Option<usize>,
    /// Frames captured by [`Runtime::current_stack_trace`](crate::Runtime::current_stack_trace)
    pub stack_trace_frame_limit: usize,
    /// Frame details requested from the engine
    pub stack_trace_options: StackTraceOptions,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            locking: false,
            engine_flags: String::new(),
            stack_limit: None,
            stack_trace_frame_limit: 10,
            stack_trace_options: StackTraceOptions::OVERVIEW,
        }
    }
}

impl RuntimeConfig {
    /// Parse and validate a JSON document
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the runtime cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.stack_trace_frame_limit == 0 {
            return Err(Error::Config(
                "stack_trace_frame_limit must be at least 1".to_string(),
            ));
        }
        if self.stack_limit == Some(0) {
            return Err(Error::Config("stack_limit must be non-zero".to_string()));
        }
        Ok(())
    }

    /// Set locking mode
    pub fn with_locking(mut self, locking: bool) -> Self {
        self.locking = locking;
        self
    }

    /// Set the engine flag string
    pub fn with_engine_flags(mut self, flags: impl Into<String>) -> Self {
        self.engine_flags = flags.into();
        self
    }

    /// Set the engine stack limit
    pub fn with_stack_limit(mut self, limit: usize) -> Self {
        self.stack_limit = Some(limit);
        self
    }

    /// Set the default frame limit for captured stack traces
    pub fn with_frame_limit(mut self, limit: usize) -> Self {
        self.stack_trace_frame_limit = limit;
        self
    }
}
