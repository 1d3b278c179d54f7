//! Script failures from execution to parsed frames and CLI output

use bridge::{Runtime, RuntimeConfig};
use bridge_cli::TraceReport;
use core_types::{Error, ScriptOrigin, StackFrame, StackTraceParser};
use integration_tests::ScriptedEngine;

fn runtime() -> Runtime {
    Runtime::initialize(RuntimeConfig::default(), ScriptedEngine::new()).unwrap()
}

#[test]
fn thrown_error_exposes_frames_lazily() {
    let runtime = runtime();
    let context = runtime.context().build().unwrap();
    let scope = context.scope().unwrap();

    let err = scope
        .eval_with_origin("throw bad input", ScriptOrigin::named("handler.js").at(1, 0))
        .unwrap_err();
    let Error::Script(err) = err else {
        panic!("expected a script error");
    };

    assert_eq!(err.to_string().split(" (").next(), Some("Error: bad input"));
    let frames = err.frames().unwrap();
    assert_eq!(
        frames,
        &[
            StackFrame::new(Some("handler"), Some("handler.js"), Some(4), Some(11)),
            StackFrame::new(None, Some("handler.js"), Some(9), Some(1)),
        ]
    );
    assert!(std::ptr::eq(frames, err.frames().unwrap()));
}

#[test]
fn compile_failure_never_reaches_execution() {
    let runtime = runtime();
    let context = runtime.context().build().unwrap();
    let scope = context.scope().unwrap();

    let Error::Script(err) = scope.eval("@@").unwrap_err() else {
        panic!("expected a script error");
    };
    assert_eq!(err.name(), "SyntaxError");
    assert!(err.stack_trace().is_none());
    assert_eq!(err.frames().unwrap(), &[] as &[StackFrame]);
}

#[test]
fn engine_trace_text_converts_through_the_cli_report() {
    let runtime = runtime();
    let context = runtime.context().build().unwrap();
    let scope = context.scope().unwrap();

    let Error::Script(err) = scope.eval("throw boom").unwrap_err() else {
        panic!("expected a script error");
    };
    let report = TraceReport::parse(err.stack_trace().unwrap()).unwrap();
    assert_eq!(report.message, "Error: boom");
    assert_eq!(report.frames, err.frames().unwrap());
}

#[test]
fn documented_trace_shapes_parse() {
    assert_eq!(
        StackTraceParser::parse("Error: boom\n    at foo (bar.js:10:5)").unwrap(),
        vec![StackFrame::new(Some("foo"), Some("bar.js"), Some(10), Some(5))]
    );
    assert_eq!(
        StackTraceParser::parse("Error: boom\n    at bar.js:3").unwrap(),
        vec![StackFrame::new(None, Some("bar.js"), Some(3), None)]
    );
    assert_eq!(
        StackTraceParser::parse("Error: boom\n    at Object.<anonymous> (native)").unwrap(),
        vec![StackFrame::new(Some("Object.<anonymous>"), Some("native"), None, None)]
    );
    assert!(matches!(
        StackTraceParser::parse("Error: boom\n    garbage"),
        Err(Error::ParseInconsistency { line_number: 2, .. })
    ));
}
