//! Per-thread entry stacks.
//!
//! Each thread keeps one stack per runtime recording the isolates and
//! contexts it has entered. Both kinds share the stack so that leaving
//! must happen in exactly the reverse order of entering.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::context::ContextId;
use crate::isolate::IsolateId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Entry {
    Isolate(IsolateId),
    Context(ContextId),
}

thread_local! {
    static STACKS: RefCell<HashMap<u64, Vec<Entry>>> = RefCell::new(HashMap::new());
}

fn read<R>(runtime: u64, f: impl FnOnce(&[Entry]) -> R) -> R {
    STACKS.with(|stacks| f(stacks.borrow().get(&runtime).map_or(&[][..], Vec::as_slice)))
}

/// Run `f` on an existing stack; empty stacks are dropped afterwards
fn modify<R>(runtime: u64, f: impl FnOnce(&mut Vec<Entry>) -> R) -> Option<R> {
    STACKS.with(|stacks| {
        let mut stacks = stacks.borrow_mut();
        let stack = stacks.get_mut(&runtime)?;
        let result = f(stack);
        if stack.is_empty() {
            stacks.remove(&runtime);
        }
        Some(result)
    })
}

pub(crate) fn push(runtime: u64, entry: Entry) {
    STACKS.with(|stacks| stacks.borrow_mut().entry(runtime).or_default().push(entry));
}

/// Pop `entry` if it is on top; returns whether it was
pub(crate) fn pop_if_top(runtime: u64, entry: Entry) -> bool {
    modify(runtime, |stack| {
        if stack.last() == Some(&entry) {
            stack.pop();
            true
        } else {
            false
        }
    })
    .unwrap_or(false)
}

/// Remove every occurrence of `entry` wherever it sits; returns how many
pub(crate) fn remove(runtime: u64, entry: Entry) -> usize {
    modify(runtime, |stack| {
        let before = stack.len();
        stack.retain(|e| *e != entry);
        before - stack.len()
    })
    .unwrap_or(0)
}

pub(crate) fn current_isolate(runtime: u64) -> Option<IsolateId> {
    read(runtime, |stack| {
        stack.iter().rev().find_map(|entry| match entry {
            Entry::Isolate(id) => Some(*id),
            Entry::Context(_) => None,
        })
    })
}

pub(crate) fn current_context(runtime: u64) -> Option<ContextId> {
    read(runtime, |stack| {
        stack.iter().rev().find_map(|entry| match entry {
            Entry::Context(id) => Some(*id),
            Entry::Isolate(_) => None,
        })
    })
}

pub(crate) fn contains(runtime: u64, entry: Entry) -> bool {
    read(runtime, |stack| stack.contains(&entry))
}

pub(crate) fn depth(runtime: u64) -> usize {
    read(runtime, |stack| stack.len())
}

#[cfg(test)]
fn is_tracked(runtime: u64) -> bool {
    STACKS.with(|stacks| stacks.borrow().contains_key(&runtime))
}

pub(crate) fn discard(runtime: u64) {
    STACKS.with(|stacks| {
        stacks.borrow_mut().remove(&runtime);
    });
}
