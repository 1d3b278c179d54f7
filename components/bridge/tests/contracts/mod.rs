//! Contract tests for the Engine seam
//!
//! These verify what the runtime forwards to the engine and when.

use std::sync::Arc;

use bridge::{Engine, ExecutionScope, IsolateId, Runtime, RuntimeConfig, Script, StackTraceOptions};
use core_types::{ScriptError, StackFrame, Value};
use parking_lot::Mutex;

#[derive(Default)]
struct Calls {
    log: Mutex<Vec<String>>,
}

impl Calls {
    fn record(&self, call: impl Into<String>) {
        self.log.lock().push(call.into());
    }

    fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.log.lock())
    }
}

struct RecordingEngine {
    calls: Arc<Calls>,
}

impl Engine for RecordingEngine {
    fn execute(&self, scope: &ExecutionScope<'_>, script: &Script) -> Result<Value, ScriptError> {
        self.calls.record(format!(
            "execute {} in context {} of isolate {}",
            script.source(),
            scope.context(),
            scope.isolate()
        ));
        Ok(Value::Null)
    }

    fn compile(&self, script: &Script) -> Result<(), ScriptError> {
        self.calls.record(format!("compile {}", script.source()));
        Ok(())
    }

    fn version(&self) -> String {
        "1.0.0".to_string()
    }

    fn packed_library_version(&self) -> u32 {
        100_000
    }

    fn capture_stack_trace(
        &self,
        isolate: IsolateId,
        frame_limit: usize,
        options: StackTraceOptions,
    ) -> Vec<StackFrame> {
        self.calls.record(format!(
            "capture isolate={} limit={} options={}",
            isolate,
            frame_limit,
            options.bits()
        ));
        Vec::new()
    }

    fn set_flags(&self, flags: &str) {
        self.calls.record(format!("flags {}", flags));
    }

    fn set_stack_limit(&self, limit: usize) {
        self.calls.record(format!("stack_limit {}", limit));
    }

    fn terminate_execution(&self) {
        self.calls.record("terminate");
    }

    fn is_dead(&self) -> bool {
        self.calls.record("is_dead");
        false
    }

    fn low_memory_notification(&self) {
        self.calls.record("low_memory");
    }
}

fn runtime_with(config: RuntimeConfig) -> (Runtime, Arc<Calls>) {
    let calls = Arc::new(Calls::default());
    let engine = RecordingEngine {
        calls: Arc::clone(&calls),
    };
    (Runtime::initialize(config, engine).unwrap(), calls)
}

#[test]
fn contract_initialize_applies_engine_settings() {
    let config = RuntimeConfig::default()
        .with_engine_flags("--expose-gc")
        .with_stack_limit(2048);
    let (_runtime, calls) = runtime_with(config);
    assert_eq!(calls.take(), vec!["flags --expose-gc", "stack_limit 2048"]);
}

#[test]
fn contract_default_settings_touch_nothing() {
    let (_runtime, calls) = runtime_with(RuntimeConfig::default());
    assert!(calls.take().is_empty());
}

#[test]
fn contract_eval_compiles_then_executes_in_the_current_context() {
    let (runtime, calls) = runtime_with(RuntimeConfig::default());
    let context = runtime.context().build().unwrap();
    let scope = context.scope().unwrap();

    assert_eq!(scope.eval("work()").unwrap(), Value::Null);
    assert_eq!(
        calls.take(),
        vec![
            "compile work()".to_string(),
            format!(
                "execute work() in context {} of isolate {}",
                context.id(),
                runtime.default_isolate().id()
            ),
        ]
    );
}

#[test]
fn contract_engine_is_not_called_outside_a_context() {
    let (runtime, calls) = runtime_with(RuntimeConfig::default());
    let context = runtime.context().build().unwrap();
    let script = context.compile("later()").unwrap();
    calls.take();

    assert!(script.run(&context).is_err());
    assert!(calls.take().is_empty());
}

#[test]
fn contract_stack_trace_forwards_configured_options() {
    let config = RuntimeConfig::default().with_frame_limit(7);
    let (runtime, calls) = runtime_with(config);
    let context = runtime.context().build().unwrap();
    let _scope = context.scope().unwrap();

    runtime.current_stack_trace().unwrap();
    assert_eq!(
        calls.take(),
        vec![format!(
            "capture isolate={} limit=7 options={}",
            runtime.default_isolate().id(),
            StackTraceOptions::OVERVIEW.bits()
        )]
    );
}

#[test]
fn contract_passthroughs_reach_the_engine() {
    let (runtime, calls) = runtime_with(RuntimeConfig::default());
    runtime.set_flags("--trace-gc");
    runtime.set_stack_limit(512);
    runtime.terminate_execution();
    assert!(!runtime.is_dead());
    runtime.low_memory_notification();

    assert_eq!(
        calls.take(),
        vec![
            "flags --trace-gc",
            "stack_limit 512",
            "terminate",
            "is_dead",
            "low_memory"
        ]
    );
}

#[test]
fn contract_library_version_decoding() {
    let (runtime, _calls) = runtime_with(RuntimeConfig::default());
    let versions = runtime.versions().unwrap();
    assert_eq!(versions.engine.to_string(), "1.0.0");
    assert_eq!(versions.library.to_string(), "1.0.0");
}
