//! Isolates: independent script execution universes.

use std::fmt;
use std::ops::Deref;

use core_types::{Error, Result, StackFrame};
use tracing::{debug, warn};

use crate::engine::StackTraceOptions;
use crate::entry_stack::{self, Entry};
use crate::runtime::Runtime;

/// Identifies an isolate within its runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IsolateId(pub(crate) u64);

impl IsolateId {
    /// Numeric id
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for IsolateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to an isolate of a [`Runtime`].
///
/// Entering pushes the isolate on the calling thread's entry stack; the
/// innermost entered isolate is the thread's current isolate. A thread
/// that has entered none runs in the runtime's default isolate.
#[derive(Clone, Copy)]
pub struct Isolate<'a> {
    runtime: &'a Runtime,
    id: IsolateId,
}

impl<'a> Isolate<'a> {
    pub(crate) fn new(runtime: &'a Runtime, id: IsolateId) -> Self {
        Self { runtime, id }
    }

    /// This isolate's id
    pub fn id(&self) -> IsolateId {
        self.id
    }

    /// Whether this is the runtime's default isolate
    pub fn is_default(&self) -> bool {
        self.id == self.runtime.default_isolate_id()
    }

    /// Whether this is the calling thread's current isolate
    pub fn is_current(&self) -> bool {
        self.runtime.current_isolate_id() == self.id
    }

    /// Whether the calling thread holds the engine lock
    pub fn is_locked(&self) -> bool {
        self.runtime.engine_lock().is_held_by_current_thread()
    }

    /// Make this the calling thread's current isolate
    pub fn enter(&self) -> Result<()> {
        entry_stack::push(self.runtime.id(), Entry::Isolate(self.id));
        debug!(isolate = %self.id, "entered isolate");
        Ok(())
    }

    /// Undo the matching [`enter`](Self::enter).
    ///
    /// Fails unless this isolate is the innermost entry on the calling
    /// thread, contexts included.
    pub fn leave(&self) -> Result<()> {
        if !entry_stack::pop_if_top(self.runtime.id(), Entry::Isolate(self.id)) {
            let message = if entry_stack::contains(self.runtime.id(), Entry::Isolate(self.id)) {
                format!("isolate {} must be left in reverse entry order", self.id)
            } else {
                format!("isolate {} is not entered", self.id)
            };
            return Err(Error::state("Isolate::leave", message));
        }
        debug!(isolate = %self.id, "left isolate");
        Ok(())
    }

    /// Enter now and leave when the returned guard drops
    pub fn scope(&self) -> Result<IsolateScope<'_, 'a>> {
        self.enter()?;
        Ok(IsolateScope {
            isolate: self,
            active: true,
        })
    }

    /// Capture the stack of the script running in this isolate
    pub fn capture_stack_trace(
        &self,
        frame_limit: usize,
        options: StackTraceOptions,
    ) -> Vec<StackFrame> {
        self.runtime
            .engine()
            .capture_stack_trace(self.id, frame_limit, options)
    }
}

impl fmt::Debug for Isolate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Isolate").field("id", &self.id).finish()
    }
}

/// Keeps an isolate entered until dropped.
#[must_use = "the isolate is left as soon as the scope is dropped"]
pub struct IsolateScope<'i, 'a> {
    isolate: &'i Isolate<'a>,
    active: bool,
}

impl IsolateScope<'_, '_> {
    /// Leave now, reporting ordering errors
    pub fn finish(mut self) -> Result<()> {
        self.active = false;
        self.isolate.leave()
    }
}

impl<'a> Deref for IsolateScope<'_, 'a> {
    type Target = Isolate<'a>;

    fn deref(&self) -> &Self::Target {
        self.isolate
    }
}

impl Drop for IsolateScope<'_, '_> {
    fn drop(&mut self) {
        if self.active {
            if let Err(err) = self.isolate.leave() {
                warn!(isolate = %self.isolate.id, %err, "implicit isolate leave failed");
            }
        }
    }
}
