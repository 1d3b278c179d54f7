use bridge::{Engine, ExecutionScope, IsolateId, Script, StackTraceOptions};
use core_types::{HostObject, ScriptError, StackFrame, Value};

/// Tiny command language standing in for real script execution:
/// `call NAME` invokes a native function, `global NAME` reads a global
/// property, `throw MESSAGE` fails with a stack trace, anything else
/// evaluates to its own text.
pub struct EchoEngine;

impl Engine for EchoEngine {
    fn compile(&self, script: &Script) -> Result<(), ScriptError> {
        if script.source().contains("syntax error") {
            return Err(ScriptError::new("SyntaxError", "Unexpected identifier"));
        }
        Ok(())
    }

    fn execute(&self, scope: &ExecutionScope<'_>, script: &Script) -> Result<Value, ScriptError> {
        let source = script.source().trim();

        if let Some(name) = source.strip_prefix("call ") {
            return match scope.native_function(name) {
                Some(f) => f
                    .call(vec![])
                    .map_err(|e| ScriptError::new("Error", e.to_string())),
                None => Err(ScriptError::new(
                    "ReferenceError",
                    format!("{} is not defined", name),
                )),
            };
        }

        if let Some(name) = source.strip_prefix("global ") {
            return scope
                .global()
                .get_property(name)
                .map(|v| v.unwrap_or(Value::Undefined))
                .map_err(|e| ScriptError::new("Error", e.to_string()));
        }

        if let Some(message) = source.strip_prefix("throw ") {
            let file = script
                .origin()
                .and_then(|o| o.name.clone())
                .unwrap_or_else(|| "<anonymous>".to_string());
            let mut error = ScriptError::new("Error", message).with_stack_trace(format!(
                "Error: {}\n    at foo ({}:10:5)\n    at {}:12",
                message, file, file
            ));
            if let Some(origin) = script.origin() {
                error = error.with_origin(origin.clone());
            }
            return Err(error);
        }

        Ok(Value::String(source.to_string()))
    }

    fn version(&self) -> String {
        "11.2.214.9-node".to_string()
    }

    fn packed_library_version(&self) -> u32 {
        300_105
    }

    fn capture_stack_trace(
        &self,
        _isolate: IsolateId,
        frame_limit: usize,
        _options: StackTraceOptions,
    ) -> Vec<StackFrame> {
        ["outer", "middle", "inner"]
            .into_iter()
            .enumerate()
            .map(|(i, name)| StackFrame::new(Some(name), Some("app.js"), Some(i as u64 + 1), None))
            .take(frame_limit)
            .collect()
    }
}
