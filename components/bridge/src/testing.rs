//! Engines for examples and tests

use core_types::{ScriptError, Value};

use crate::engine::{Engine, ExecutionScope, Script};

/// Engine that accepts every script and returns `undefined`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEngine;

impl Engine for NullEngine {
    fn execute(&self, _scope: &ExecutionScope<'_>, _script: &Script) -> Result<Value, ScriptError> {
        Ok(Value::Undefined)
    }

    fn version(&self) -> String {
        "0.0.0".to_string()
    }

    fn packed_library_version(&self) -> u32 {
        0
    }
}
