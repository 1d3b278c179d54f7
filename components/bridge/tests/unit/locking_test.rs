use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use bridge::testing::NullEngine;
use bridge::{Runtime, RuntimeConfig};
use core_types::Error;

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
fn locking_turns_on_at_first_locker_entry_and_stays_on() {
    let runtime = runtime();
    let locker = runtime.locker();
    assert!(!runtime.locking_active());
    assert!(!locker.is_active());

    locker.enter().unwrap();
    assert!(runtime.locking_active());
    locker.leave().unwrap();

    assert!(runtime.locking_active());
    assert!(runtime.locker().is_active());
}

#[test]
fn locker_is_reentrant_and_reports_entered_state() {
    let runtime = runtime();
    let locker = runtime.locker();

    locker.enter().unwrap();
    locker.enter().unwrap();
    locker.leave().unwrap();
    assert!(locker.entered());
    assert!(locker.is_locked());

    locker.leave().unwrap();
    assert!(!locker.entered());
    assert!(!runtime.is_locked());
    assert!(locker.leave().unwrap_err().is_state());
}

#[test]
fn locker_entered_inside_context_is_rejected() {
    let runtime = runtime();
    let context = runtime.context().build().unwrap();
    context.enter().unwrap();

    let locker = runtime.locker();
    let err = locker.enter().unwrap_err();
    assert_eq!(
        state_message(err),
        "lock must be acquired before entering context"
    );
    assert!(!locker.entered());
    assert!(!runtime.is_locked());
    assert!(!runtime.locking_active());

    context.leave().unwrap();
}

#[test]
fn locker_left_before_context_is_rejected_on_both_sides() {
    let runtime = runtime();
    let locker = runtime.locker();
    locker.enter().unwrap();

    let context = runtime.context().locker(&locker).build().unwrap();
    context.enter().unwrap();

    let err = locker.leave().unwrap_err();
    assert_eq!(
        state_message(err),
        "lock must be released after leaving context"
    );
    assert!(!locker.entered());

    let err = context.leave().unwrap_err();
    assert_eq!(
        state_message(err),
        "lock must be released after leaving context"
    );
    assert!(!runtime.in_context());
}

#[test]
fn context_with_unentered_locker_cannot_become_current() {
    let runtime =
        Runtime::initialize(RuntimeConfig::default().with_locking(true), NullEngine).unwrap();
    let locker = runtime.locker();
    let context = runtime.context().locker(&locker).build().unwrap();

    let err = context.enter().unwrap_err();
    assert_eq!(
        state_message(err),
        "lock must be acquired before entering context"
    );
    assert!(!runtime.in_context());
    assert!(!context.is_current());

    locker.enter().unwrap();
    context.enter().unwrap();
    context.leave().unwrap();
    locker.leave().unwrap();
}

#[test]
fn context_built_before_locking_needs_the_lock_afterwards() {
    let runtime = runtime();
    let context = runtime.context().build().unwrap();

    let locker = runtime.locker();
    locker.enter().unwrap();
    locker.leave().unwrap();

    assert!(context.enter().unwrap_err().is_state());

    let _lock = locker.scope().unwrap();
    let scope = context.scope().unwrap();
    assert!(scope.is_current());
}

#[test]
fn implicit_locker_follows_context_lifetime() {
    let runtime =
        Runtime::initialize(RuntimeConfig::default().with_locking(true), NullEngine).unwrap();
    let context = runtime.context().build().unwrap();
    assert!(runtime.is_locked());

    context.enter().unwrap();
    context.leave().unwrap();
    assert!(!runtime.is_locked());

    context.enter().unwrap();
    assert!(runtime.is_locked());
    context.leave().unwrap();

    drop(context);
    assert!(!runtime.is_locked());
}

#[test]
fn unlocker_lets_another_thread_in() {
    let runtime = runtime();
    let locker = runtime.locker();
    let _lock = locker.scope().unwrap();
    let other_ran = AtomicBool::new(false);

    {
        let unlocker = runtime.unlocker();
        let suspended = unlocker.scope().unwrap();
        assert!(suspended.entered());
        assert!(!runtime.is_locked());

        thread::scope(|s| {
            s.spawn(|| {
                let locker = runtime.locker();
                let _lock = locker.scope().unwrap();
                other_ran.store(true, Ordering::SeqCst);
            });
        });
        suspended.finish().unwrap();
    }

    assert!(other_ran.load(Ordering::SeqCst));
    assert!(locker.entered());
    assert!(locker.is_locked());
}

#[test]
fn unlocker_requires_the_lock() {
    let runtime = runtime();
    let unlocker = runtime.unlocker();
    assert!(unlocker.enter().unwrap_err().is_state());
    assert!(!unlocker.entered());
    assert!(unlocker.leave().unwrap_err().is_state());
}

#[test]
fn lockers_exclude_each_other_across_threads() {
    let runtime = runtime();
    let inside = AtomicUsize::new(0);
    let overlaps = AtomicUsize::new(0);

    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..10 {
                    let locker = runtime.locker();
                    let _lock = locker.scope().unwrap();
                    if inside.fetch_add(1, Ordering::SeqCst) != 0 {
                        overlaps.fetch_add(1, Ordering::SeqCst);
                    }
                    thread::sleep(Duration::from_micros(200));
                    inside.fetch_sub(1, Ordering::SeqCst);
                }
            });
        }
    });

    assert_eq!(overlaps.load(Ordering::SeqCst), 0);
    assert!(!runtime.is_locked());
}
