//! Lockers and unlockers: permits for touching the engine from a thread.
//!
//! A [`Locker`] takes the runtime's engine lock; an [`Unlocker`] gives it
//! up temporarily inside a locked region. Both are reentrant and must be
//! left as many times as they were entered. Neither may cross threads.

use std::cell::Cell;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;

use core_types::{Error, Result};
use tracing::{debug, warn};

use crate::entry_stack;
use crate::runtime::Runtime;

/// Exclusive permit to use the engine from the calling thread.
///
/// The first successful [`enter`](Self::enter) of any locker switches the
/// runtime into locking mode for good: from then on every new context
/// takes the lock itself unless it is handed a locker.
///
/// # Examples
///
/// ```
/// # use bridge::testing::NullEngine;
/// use bridge::{Locker, Runtime, RuntimeConfig};
///
/// let runtime = Runtime::initialize(RuntimeConfig::default(), NullEngine).unwrap();
/// assert!(!runtime.locking_active());
///
/// let locker = Locker::new(&runtime);
/// {
///     let _guard = locker.scope().unwrap();
///     assert!(locker.entered());
/// }
/// assert!(!locker.entered());
/// assert!(runtime.locking_active());
/// ```
pub struct Locker<'a> {
    runtime: &'a Runtime,
    depth: Cell<usize>,
    _thread_bound: PhantomData<*const ()>,
}

impl<'a> Locker<'a> {
    /// A locker for `runtime`, not yet entered
    pub fn new(runtime: &'a Runtime) -> Self {
        Self {
            runtime,
            depth: Cell::new(0),
            _thread_bound: PhantomData,
        }
    }

    /// Whether this locker is currently entered
    pub fn entered(&self) -> bool {
        self.depth.get() > 0
    }

    /// Whether any locker has ever been entered in this runtime
    pub fn is_active(&self) -> bool {
        self.runtime.locking_active()
    }

    /// Whether the calling thread holds the engine lock
    pub fn is_locked(&self) -> bool {
        self.runtime.engine_lock().is_held_by_current_thread()
    }

    /// Take the engine lock, blocking while another thread holds it.
    ///
    /// Must happen before any context is entered on this thread; otherwise
    /// the lock is given back and a state error returned.
    pub fn enter(&self) -> Result<()> {
        self.acquire();
        if entry_stack::current_context(self.runtime.id()).is_some() {
            self.release("Locker::enter")?;
            return Err(Error::state(
                "Locker::enter",
                "lock must be acquired before entering context",
            ));
        }
        self.runtime.activate_locking();
        debug!(depth = self.depth.get(), "entered locker");
        Ok(())
    }

    /// Give back one level of the engine lock.
    ///
    /// Must happen after every context on this thread has been left;
    /// otherwise the lock is still released but a state error returned.
    pub fn leave(&self) -> Result<()> {
        if !self.entered() {
            return Err(Error::state("Locker::leave", "locker is not entered"));
        }
        let in_context = entry_stack::current_context(self.runtime.id()).is_some();
        self.release("Locker::leave")?;
        if in_context {
            return Err(Error::state(
                "Locker::leave",
                "lock must be released after leaving context",
            ));
        }
        debug!(depth = self.depth.get(), "left locker");
        Ok(())
    }

    /// Enter now and leave when the returned guard drops
    pub fn scope(&self) -> Result<LockerScope<'_, 'a>> {
        self.enter()?;
        Ok(LockerScope {
            locker: self,
            active: true,
        })
    }

    /// Acquire without the context ordering check
    pub(crate) fn acquire(&self) {
        self.runtime.engine_lock().acquire();
        self.depth.set(self.depth.get() + 1);
    }

    /// Release without the context ordering check
    pub(crate) fn release(&self, operation: &'static str) -> Result<()> {
        self.runtime.engine_lock().release(operation)?;
        self.depth.set(self.depth.get() - 1);
        Ok(())
    }
}

impl fmt::Debug for Locker<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Locker")
            .field("depth", &self.depth.get())
            .finish()
    }
}

impl Drop for Locker<'_> {
    fn drop(&mut self) {
        while self.entered() {
            if let Err(err) = self.release("Locker::drop") {
                warn!(%err, "dropped locker could not release the engine lock");
                break;
            }
        }
    }
}

/// Keeps a locker entered until dropped.
#[must_use = "the locker is left as soon as the scope is dropped"]
pub struct LockerScope<'l, 'a> {
    locker: &'l Locker<'a>,
    active: bool,
}

impl LockerScope<'_, '_> {
    /// Leave now, reporting ordering errors
    pub fn finish(mut self) -> Result<()> {
        self.active = false;
        self.locker.leave()
    }
}

impl<'a> Deref for LockerScope<'_, 'a> {
    type Target = Locker<'a>;

    fn deref(&self) -> &Self::Target {
        self.locker
    }
}

impl Drop for LockerScope<'_, '_> {
    fn drop(&mut self) {
        if self.active {
            if let Err(err) = self.locker.leave() {
                warn!(%err, "implicit locker leave failed");
            }
        }
    }
}

/// Temporarily gives up the engine lock held by the calling thread.
///
/// Leaving blocks until the lock can be taken back, then restores the
/// depth the thread held before.
pub struct Unlocker<'a> {
    runtime: &'a Runtime,
    depth: Cell<usize>,
    saved: Cell<usize>,
    _thread_bound: PhantomData<*const ()>,
}

impl<'a> Unlocker<'a> {
    /// An unlocker for `runtime`, not yet entered
    pub fn new(runtime: &'a Runtime) -> Self {
        Self {
            runtime,
            depth: Cell::new(0),
            saved: Cell::new(0),
            _thread_bound: PhantomData,
        }
    }

    /// Whether this unlocker is currently entered
    pub fn entered(&self) -> bool {
        self.depth.get() > 0
    }

    /// Release the engine lock; the calling thread must hold it
    pub fn enter(&self) -> Result<()> {
        if !self.entered() {
            let saved = self.runtime.engine_lock().suspend("Unlocker::enter")?;
            self.saved.set(saved);
            debug!(saved, "suspended engine lock");
        }
        self.depth.set(self.depth.get() + 1);
        Ok(())
    }

    /// Undo one [`enter`](Self::enter); the last one takes the lock back
    pub fn leave(&self) -> Result<()> {
        if !self.entered() {
            return Err(Error::state("Unlocker::leave", "unlocker is not entered"));
        }
        self.depth.set(self.depth.get() - 1);
        if !self.entered() {
            self.runtime.engine_lock().resume(self.saved.get());
            debug!(restored = self.saved.get(), "resumed engine lock");
        }
        Ok(())
    }

    /// Enter now and leave when the returned guard drops
    pub fn scope(&self) -> Result<UnlockerScope<'_, 'a>> {
        self.enter()?;
        Ok(UnlockerScope {
            unlocker: self,
            active: true,
        })
    }
}

impl fmt::Debug for Unlocker<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unlocker")
            .field("depth", &self.depth.get())
            .finish()
    }
}

impl Drop for Unlocker<'_> {
    fn drop(&mut self) {
        if self.entered() {
            self.depth.set(0);
            self.runtime.engine_lock().resume(self.saved.get());
        }
    }
}

/// Keeps an unlocker entered until dropped.
#[must_use = "the unlocker is left as soon as the scope is dropped"]
pub struct UnlockerScope<'u, 'a> {
    unlocker: &'u Unlocker<'a>,
    active: bool,
}

impl UnlockerScope<'_, '_> {
    /// Leave now and take the lock back
    pub fn finish(mut self) -> Result<()> {
        self.active = false;
        self.unlocker.leave()
    }
}

impl<'a> Deref for UnlockerScope<'_, 'a> {
    type Target = Unlocker<'a>;

    fn deref(&self) -> &Self::Target {
        self.unlocker
    }
}

impl Drop for UnlockerScope<'_, '_> {
    fn drop(&mut self) {
        if self.active {
            if let Err(err) = self.unlocker.leave() {
                warn!(%err, "implicit unlocker leave failed");
            }
        }
    }
}
