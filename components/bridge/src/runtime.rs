//! The process-scoped runtime object.
//!
//! A [`Runtime`] owns everything the bridge would otherwise keep in
//! globals: the platform, the default isolate, the engine lock, the
//! locking-mode flag and the extension registry. Isolates, lockers and
//! contexts borrow it, so it cannot be shut down while any of them live.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use core_types::{Error, Result, StackFrame, Version};
use extensions::ExtensionRegistry;
use tracing::{debug, info};

use crate::config::RuntimeConfig;
use crate::context::{ContextBuilder, ContextId};
use crate::engine::Engine;
use crate::entry_stack::{self, Entry};
use crate::isolate::{Isolate, IsolateId};
use crate::lock::EngineLock;
use crate::locker::{Locker, Unlocker};
use crate::platform::Platform;

static NEXT_RUNTIME_ID: AtomicU64 = AtomicU64::new(1);

const DEFAULT_ISOLATE: IsolateId = IsolateId(1);

/// Engine and companion library versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Versions {
    /// Script engine version
    pub engine: Version,
    /// Companion library version
    pub library: Version,
}

/// Process-scoped bridge state.
///
/// Initialization brings up the platform and enters the default isolate;
/// dropping the runtime (or [`shutdown`](Runtime::shutdown)) undoes both
/// in reverse order.
///
/// # Examples
///
/// ```
/// # use bridge::testing::NullEngine;
/// use bridge::{Runtime, RuntimeConfig};
///
/// let runtime = Runtime::initialize(RuntimeConfig::default(), NullEngine).unwrap();
/// assert!(runtime.platform().is_initialized());
/// assert!(runtime.current_isolate().is_default());
/// runtime.shutdown().unwrap();
/// ```
pub struct Runtime {
    id: u64,
    config: RuntimeConfig,
    engine: Box<dyn Engine>,
    platform: Platform,
    lock: EngineLock,
    locking_active: AtomicBool,
    extensions: ExtensionRegistry,
    next_isolate: AtomicU64,
    next_context: AtomicU64,
}

impl Runtime {
    /// Bring up the platform, configure the engine and enter the default
    /// isolate
    pub fn initialize(config: RuntimeConfig, engine: impl Engine + 'static) -> Result<Self> {
        config.validate()?;

        let platform = Platform::new();
        platform.initialize()?;

        if !config.engine_flags.is_empty() {
            engine.set_flags(&config.engine_flags);
        }
        if let Some(limit) = config.stack_limit {
            engine.set_stack_limit(limit);
        }

        let runtime = Self {
            id: NEXT_RUNTIME_ID.fetch_add(1, Ordering::Relaxed),
            locking_active: AtomicBool::new(config.locking),
            config,
            engine: Box::new(engine),
            platform,
            lock: EngineLock::new(),
            extensions: ExtensionRegistry::new(),
            next_isolate: AtomicU64::new(DEFAULT_ISOLATE.0 + 1),
            next_context: AtomicU64::new(1),
        };
        entry_stack::push(runtime.id, Entry::Isolate(DEFAULT_ISOLATE));
        info!(
            runtime = runtime.id,
            engine = %runtime.engine.version(),
            locking = runtime.locking_active(),
            "runtime initialized"
        );
        Ok(runtime)
    }

    /// Tear the runtime down.
    ///
    /// Fails when the calling thread still has isolates or contexts
    /// entered beyond the default isolate, or some thread still holds the
    /// engine lock. The runtime is disposed either way.
    pub fn shutdown(self) -> Result<()> {
        let default_entry = Entry::Isolate(DEFAULT_ISOLATE);
        let mut open = entry_stack::depth(self.id);
        if open == 1 && entry_stack::contains(self.id, default_entry) {
            open = 0;
        }
        if open > 0 {
            return Err(Error::state(
                "Runtime::shutdown",
                format!("{} entries are still on this thread's entry stack", open),
            ));
        }
        if self.lock.is_locked() {
            return Err(Error::state("Runtime::shutdown", "engine lock is still held"));
        }
        entry_stack::pop_if_top(self.id, default_entry);
        Ok(())
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn engine_lock(&self) -> &EngineLock {
        &self.lock
    }

    pub(crate) fn next_context_id(&self) -> ContextId {
        ContextId(self.next_context.fetch_add(1, Ordering::Relaxed))
    }

    /// Settings the runtime was initialized with
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// The driven engine
    pub fn engine(&self) -> &dyn Engine {
        self.engine.as_ref()
    }

    /// The engine platform
    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Registered extensions
    pub fn extensions(&self) -> &ExtensionRegistry {
        &self.extensions
    }

    /// Whether locking mode is on; it never turns off again
    pub fn locking_active(&self) -> bool {
        self.locking_active.load(Ordering::Acquire)
    }

    pub(crate) fn activate_locking(&self) {
        if !self.locking_active.swap(true, Ordering::AcqRel) {
            info!(runtime = self.id, "locking mode activated");
        }
    }

    /// Whether any thread holds the engine lock
    pub fn is_locked(&self) -> bool {
        self.lock.is_locked()
    }

    /// The isolate entered on the initializing thread
    pub fn default_isolate(&self) -> Isolate<'_> {
        Isolate::new(self, DEFAULT_ISOLATE)
    }

    pub(crate) fn default_isolate_id(&self) -> IsolateId {
        DEFAULT_ISOLATE
    }

    /// Create another isolate
    pub fn new_isolate(&self) -> Isolate<'_> {
        let id = IsolateId(self.next_isolate.fetch_add(1, Ordering::Relaxed));
        debug!(isolate = %id, "created isolate");
        Isolate::new(self, id)
    }

    /// The calling thread's innermost entered isolate, or the default one
    pub fn current_isolate(&self) -> Isolate<'_> {
        Isolate::new(self, self.current_isolate_id())
    }

    pub(crate) fn current_isolate_id(&self) -> IsolateId {
        entry_stack::current_isolate(self.id).unwrap_or(DEFAULT_ISOLATE)
    }

    /// A locker for this runtime
    pub fn locker(&self) -> Locker<'_> {
        Locker::new(self)
    }

    /// An unlocker for this runtime
    pub fn unlocker(&self) -> Unlocker<'_> {
        Unlocker::new(self)
    }

    /// Start building a context
    pub fn context(&self) -> ContextBuilder<'_> {
        ContextBuilder::new(self)
    }

    /// Whether the calling thread has entered a context
    pub fn in_context(&self) -> bool {
        entry_stack::current_context(self.id).is_some()
    }

    /// The calling thread's innermost entered context
    pub fn current_context(&self) -> Option<ContextId> {
        entry_stack::current_context(self.id)
    }

    /// Engine and library versions.
    ///
    /// The engine reports `major.minor.patch` with an optional suffix; the
    /// library version is decoded from its packed form.
    pub fn versions(&self) -> Result<Versions> {
        let text = self.engine.version();
        let engine = Version::parse(&text)
            .ok_or_else(|| Error::Type(format!("unrecognized engine version {:?}", text)))?;
        let library = Version::from_packed(self.engine.packed_library_version());
        Ok(Versions { engine, library })
    }

    /// Stack of the script running on this thread, using the configured
    /// frame limit and options
    pub fn current_stack_trace(&self) -> Result<Vec<StackFrame>> {
        if !self.in_context() {
            return Err(Error::state(
                "Runtime::current_stack_trace",
                "no context is entered on this thread",
            ));
        }
        Ok(self.current_isolate().capture_stack_trace(
            self.config.stack_trace_frame_limit,
            self.config.stack_trace_options,
        ))
    }

    /// Forward a flag string to the engine
    pub fn set_flags(&self, flags: &str) {
        debug!(flags, "setting engine flags");
        self.engine.set_flags(flags);
    }

    /// Forward a stack limit to the engine
    pub fn set_stack_limit(&self, limit: usize) {
        self.engine.set_stack_limit(limit);
    }

    /// Stop every running script
    pub fn terminate_execution(&self) {
        info!(runtime = self.id, "terminating script execution");
        self.engine.terminate_execution();
    }

    /// Whether the engine can no longer run scripts
    pub fn is_dead(&self) -> bool {
        self.engine.is_dead()
    }

    /// Tell the engine the host is short on memory
    pub fn low_memory_notification(&self) {
        self.engine.low_memory_notification();
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("id", &self.id)
            .field("locking_active", &self.locking_active())
            .field("extensions", &self.extensions.names())
            .finish()
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        if entry_stack::pop_if_top(self.id, Entry::Isolate(DEFAULT_ISOLATE)) {
            debug!(isolate = %DEFAULT_ISOLATE, "left default isolate");
        }
        entry_stack::discard(self.id);
        self.platform.dispose();
        info!(runtime = self.id, "runtime shut down");
    }
}
