//! The engine lock.
//!
//! One reentrant, thread-owned lock per runtime stands in for the engine's
//! native isolate lock. Lockers acquire it, unlockers suspend it, and
//! contexts created in locking mode hold it while they are alive.

use std::thread::{self, ThreadId};

use core_types::{Error, Result};
use parking_lot::{Condvar, Mutex};

#[derive(Debug, Default)]
struct LockState {
    owner: Option<ThreadId>,
    depth: usize,
}

/// Reentrant lock owned by at most one thread.
#[derive(Debug, Default)]
pub(crate) struct EngineLock {
    state: Mutex<LockState>,
    released: Condvar,
}

impl EngineLock {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Block until the calling thread owns the lock, then add one level
    pub(crate) fn acquire(&self) {
        let me = thread::current().id();
        let mut state = self.state.lock();
        loop {
            match state.owner {
                None => {
                    state.owner = Some(me);
                    state.depth = 1;
                    return;
                }
                Some(owner) if owner == me => {
                    state.depth += 1;
                    return;
                }
                Some(_) => self.released.wait(&mut state),
            }
        }
    }

    /// Drop one level; the lock is free once the depth reaches zero
    pub(crate) fn release(&self, operation: &'static str) -> Result<()> {
        let me = thread::current().id();
        let mut state = self.state.lock();
        if state.owner != Some(me) {
            return Err(Error::state(operation, "engine lock is not held by this thread"));
        }
        state.depth -= 1;
        if state.depth == 0 {
            state.owner = None;
            self.released.notify_one();
        }
        Ok(())
    }

    /// Give the lock up entirely, returning the depth to restore later
    pub(crate) fn suspend(&self, operation: &'static str) -> Result<usize> {
        let me = thread::current().id();
        let mut state = self.state.lock();
        if state.owner != Some(me) {
            return Err(Error::state(operation, "engine lock is not held by this thread"));
        }
        let depth = state.depth;
        state.owner = None;
        state.depth = 0;
        self.released.notify_one();
        Ok(depth)
    }

    /// Block until the lock is free, then take it back at `depth`
    pub(crate) fn resume(&self, depth: usize) {
        let me = thread::current().id();
        let mut state = self.state.lock();
        while state.owner.is_some() {
            self.released.wait(&mut state);
        }
        state.owner = Some(me);
        state.depth = depth;
    }

    pub(crate) fn is_held_by_current_thread(&self) -> bool {
        self.state.lock().owner == Some(thread::current().id())
    }

    pub(crate) fn is_locked(&self) -> bool {
        self.state.lock().owner.is_some()
    }
}
