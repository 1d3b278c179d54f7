use bridge::testing::NullEngine;
use bridge::{Runtime, RuntimeConfig};
use core_types::{Error, Result};

fn runtime() -> Runtime {
    Runtime::initialize(RuntimeConfig::default(), NullEngine).unwrap()
}

fn state_message(err: Error) -> String {
    match err {
        Error::State { message, .. } => message,
        other => panic!("expected state error, got {:?}", other),
    }
}

#[test]
fn well_nested_sequence_raises_nothing() {
    let runtime = runtime();
    let isolate = runtime.new_isolate();
    let locker = runtime.locker();

    let lock = locker.scope().unwrap();
    let entered = isolate.scope().unwrap();
    let context = runtime.context().build().unwrap();
    let scope = context.scope().unwrap();
    assert_eq!(runtime.current_context(), Some(context.id()));
    assert_eq!(context.isolate(), isolate.id());

    scope.finish().unwrap();
    entered.finish().unwrap();
    lock.finish().unwrap();
    assert!(!runtime.in_context());
}

#[test]
fn contexts_leave_in_reverse_order() {
    let runtime = runtime();
    let outer = runtime.context().build().unwrap();
    let inner = runtime.context().build().unwrap();

    outer.enter().unwrap();
    inner.enter().unwrap();
    assert!(inner.is_current());
    assert!(!outer.is_current());
    assert!(outer.entered());

    let err = outer.leave().unwrap_err();
    assert!(state_message(err).contains("reverse entry order"));

    inner.leave().unwrap();
    assert!(outer.is_current());
    outer.leave().unwrap();
}

#[test]
fn leaving_an_unentered_context_fails() {
    let runtime = runtime();
    let context = runtime.context().build().unwrap();
    let err = context.leave().unwrap_err();
    assert!(state_message(err).contains("is not entered"));
}

#[test]
fn context_reentry_nests() {
    let runtime = runtime();
    let context = runtime.context().build().unwrap();

    context.enter().unwrap();
    context.enter().unwrap();
    context.leave().unwrap();
    assert!(context.is_current());
    context.leave().unwrap();
    assert!(!context.entered());
}

#[test]
fn isolate_cannot_be_left_under_an_open_context() {
    let runtime = runtime();
    let isolate = runtime.new_isolate();
    isolate.enter().unwrap();
    assert!(isolate.is_current());

    let context = runtime.context().build().unwrap();
    context.enter().unwrap();
    assert!(isolate.leave().unwrap_err().is_state());

    context.leave().unwrap();
    isolate.leave().unwrap();
    assert!(runtime.current_isolate().is_default());
    assert!(isolate.leave().unwrap_err().is_state());
}

#[test]
fn context_only_enters_in_its_own_isolate() {
    let runtime = runtime();
    let context = runtime.context().build().unwrap();
    let other = runtime.new_isolate();

    let inside = other.scope().unwrap();
    let err = context.enter().unwrap_err();
    assert!(state_message(err).contains("belongs to isolate"));
    inside.finish().unwrap();

    context.enter().unwrap();
    context.leave().unwrap();
}

#[test]
fn scope_guards_leave_on_early_return() {
    fn failing_step(runtime: &Runtime) -> Result<()> {
        let context = runtime.context().build()?;
        let _scope = context.scope()?;
        Err(Error::NotSupported("step".into()))
    }

    let runtime = runtime();
    assert!(failing_step(&runtime).is_err());
    assert!(!runtime.in_context());
}

#[test]
fn dropping_an_entered_context_leaves_it() {
    let runtime = runtime();
    let context = runtime.context().build().unwrap();
    context.enter().unwrap();
    assert!(runtime.in_context());

    drop(context);
    assert!(!runtime.in_context());
}

#[test]
fn dropping_a_buried_context_clears_its_entry() {
    let runtime = runtime();
    let outer = runtime.context().build().unwrap();
    let inner = runtime.context().build().unwrap();
    let inner_id = inner.id();

    outer.enter().unwrap();
    inner.enter().unwrap();
    drop(outer);
    assert_eq!(runtime.current_context(), Some(inner_id));

    inner.leave().unwrap();
    assert!(!runtime.in_context());
    assert_eq!(runtime.current_context(), None);

    let locker = runtime.locker();
    locker.enter().unwrap();
    locker.leave().unwrap();
}

#[test]
fn shutdown_with_only_the_default_isolate_entered() {
    let runtime = runtime();
    let default = runtime.default_isolate();
    assert!(default.is_current());

    default.enter().unwrap();
    default.leave().unwrap();
    runtime.shutdown().unwrap();
}

#[test]
fn entry_stacks_are_per_thread() {
    let runtime = runtime();
    let context = runtime.context().build().unwrap();
    let _scope = context.scope().unwrap();

    let seen_elsewhere = std::thread::scope(|s| s.spawn(|| runtime.in_context()).join().unwrap());
    assert!(!seen_elsewhere);
    assert!(runtime.in_context());
}

#[test]
fn shutdown_after_balanced_use() {
    let runtime = runtime();
    {
        let context = runtime.context().build().unwrap();
        let _scope = context.scope().unwrap();
    }
    runtime.shutdown().unwrap();
}
