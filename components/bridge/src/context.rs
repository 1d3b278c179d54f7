//! Contexts: script execution scopes with a global object and extensions.

use std::cell::Cell;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use core_types::{Error, NativeFunction, ObjectRef, Result, ScriptOrigin, Value};
use extensions::Extension;
use object_model::ClassDescriptor;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::engine::{resolve_native, ExecutionScope, Script};
use crate::entry_stack::{self, Entry};
use crate::isolate::IsolateId;
use crate::locker::Locker;
use crate::runtime::Runtime;

/// Identifies a context within its runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(pub(crate) u64);

impl ContextId {
    /// Numeric id
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a context relates to the engine lock.
enum ContextLock<'a> {
    /// Built before locking mode was active
    Unlocked,
    /// Implicit locker taken at construction
    Owned(Locker<'a>),
    /// Locker supplied by the caller
    Borrowed(&'a Locker<'a>),
}

/// Builder for [`Context`].
///
/// Obtained from [`Runtime::context`].
pub struct ContextBuilder<'a> {
    runtime: &'a Runtime,
    global: Option<ObjectRef>,
    extensions: Vec<String>,
    locker: Option<&'a Locker<'a>>,
}

impl<'a> ContextBuilder<'a> {
    pub(crate) fn new(runtime: &'a Runtime) -> Self {
        Self {
            runtime,
            global: None,
            extensions: Vec::new(),
            locker: None,
        }
    }

    /// Host object that becomes the script global
    pub fn global(mut self, global: ObjectRef) -> Self {
        self.global = Some(global);
        self
    }

    /// Extensions to enable in addition to the auto-enabled ones
    pub fn extensions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions.extend(names.into_iter().map(Into::into));
        self
    }

    /// Use `locker` instead of taking an implicit one
    pub fn locker(mut self, locker: &'a Locker<'a>) -> Self {
        self.locker = Some(locker);
        self
    }

    /// Create the context in the calling thread's current isolate.
    ///
    /// The enabled extension set is resolved now; later changes to
    /// auto-enable flags do not affect this context.
    pub fn build(self) -> Result<Context<'a>> {
        let extensions = self.runtime.extensions().resolve(&self.extensions)?;
        let global: ObjectRef = match self.global {
            Some(global) => global,
            None => ClassDescriptor::plain("global").instantiate(),
        };
        let isolate = self.runtime.current_isolate_id();
        Ok(Context::create(self.runtime, isolate, global, extensions, self.locker))
    }
}

impl fmt::Debug for ContextBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextBuilder")
            .field("extensions", &self.extensions)
            .field("has_global", &self.global.is_some())
            .field("has_locker", &self.locker.is_some())
            .finish()
    }
}

/// A script execution scope.
///
/// Entering pushes the context on the calling thread's entry stack; only
/// the innermost entered context runs scripts. In locking mode the engine
/// lock must be held across the whole entered span: a context built
/// without a locker takes one itself at construction, releases it on its
/// last leave and takes it again on the next enter.
///
/// # Examples
///
/// ```
/// # use bridge::testing::NullEngine;
/// use bridge::{Runtime, RuntimeConfig};
///
/// let runtime = Runtime::initialize(RuntimeConfig::default(), NullEngine).unwrap();
/// let context = runtime.context().build().unwrap();
///
/// assert!(!runtime.in_context());
/// {
///     let scope = context.scope().unwrap();
///     assert!(scope.is_current());
/// }
/// assert!(!runtime.in_context());
/// ```
pub struct Context<'a> {
    runtime: &'a Runtime,
    id: ContextId,
    isolate: IsolateId,
    global: ObjectRef,
    extensions: Vec<Arc<Extension>>,
    security_token: Mutex<Option<Value>>,
    lock: ContextLock<'a>,
    depth: Cell<usize>,
}

impl<'a> Context<'a> {
    fn create(
        runtime: &'a Runtime,
        isolate: IsolateId,
        global: ObjectRef,
        extensions: Vec<Arc<Extension>>,
        locker: Option<&'a Locker<'a>>,
    ) -> Self {
        let lock = match locker {
            Some(locker) => ContextLock::Borrowed(locker),
            None if runtime.locking_active() => {
                let owned = Locker::new(runtime);
                owned.acquire();
                ContextLock::Owned(owned)
            }
            None => ContextLock::Unlocked,
        };

        let context = Self {
            runtime,
            id: runtime.next_context_id(),
            isolate,
            global,
            extensions,
            security_token: Mutex::new(None),
            lock,
            depth: Cell::new(0),
        };
        debug!(
            context = %context.id,
            isolate = %context.isolate,
            extensions = ?context.enabled_extensions(),
            "created context"
        );
        context
    }

    /// A new context in `other`'s isolate sharing its global object and
    /// extensions
    pub fn from_context(other: &Context<'a>) -> Context<'a> {
        let context = Self::create(
            other.runtime,
            other.isolate,
            Arc::clone(&other.global),
            other.extensions.clone(),
            None,
        );
        *context.security_token.lock() = other.security_token();
        context
    }

    /// This context's id
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// The isolate the context was created in
    pub fn isolate(&self) -> IsolateId {
        self.isolate
    }

    /// The script global object
    pub fn global(&self) -> &ObjectRef {
        &self.global
    }

    /// Names of the enabled extensions in load order
    pub fn enabled_extensions(&self) -> Vec<String> {
        self.extensions
            .iter()
            .map(|e| e.name().to_string())
            .collect()
    }

    /// Resolve a native function declared by an enabled extension
    pub fn native_function(&self, name: &str) -> Option<NativeFunction> {
        resolve_native(&self.extensions, name)
    }

    /// Current security token
    pub fn security_token(&self) -> Option<Value> {
        self.security_token.lock().clone()
    }

    /// Replace the security token
    pub fn set_security_token(&self, token: Value) {
        *self.security_token.lock() = Some(token);
    }

    /// Whether this is the calling thread's innermost entered context
    pub fn is_current(&self) -> bool {
        entry_stack::current_context(self.runtime.id()) == Some(self.id)
    }

    /// Whether the context is entered anywhere on the calling thread
    pub fn entered(&self) -> bool {
        self.depth.get() > 0
    }

    /// Make this the calling thread's current context
    pub fn enter(&self) -> Result<()> {
        self.check_lock_before_enter()?;

        let current = self.runtime.current_isolate_id();
        if current != self.isolate {
            return Err(Error::state(
                "Context::enter",
                format!(
                    "context {} belongs to isolate {} but isolate {} is current",
                    self.id, self.isolate, current
                ),
            ));
        }

        if let ContextLock::Owned(locker) = &self.lock {
            if !locker.entered() {
                locker.acquire();
            }
        }

        entry_stack::push(self.runtime.id(), Entry::Context(self.id));
        self.depth.set(self.depth.get() + 1);
        debug!(context = %self.id, depth = self.depth.get(), "entered context");
        Ok(())
    }

    fn check_lock_before_enter(&self) -> Result<()> {
        if !self.runtime.locking_active() {
            return Ok(());
        }
        let locked = match &self.lock {
            ContextLock::Owned(_) => true,
            ContextLock::Borrowed(locker) => locker.entered(),
            ContextLock::Unlocked => self.runtime.engine_lock().is_held_by_current_thread(),
        };
        if locked {
            Ok(())
        } else {
            Err(Error::state(
                "Context::enter",
                "lock must be acquired before entering context",
            ))
        }
    }

    /// Undo the matching [`enter`](Self::enter).
    ///
    /// The context must be the innermost entry on the calling thread. When
    /// its locker was already left, the context is still left and a state
    /// error reports the misordering.
    pub fn leave(&self) -> Result<()> {
        if !entry_stack::pop_if_top(self.runtime.id(), Entry::Context(self.id)) {
            let message = if self.entered() {
                format!("context {} must be left in reverse entry order", self.id)
            } else {
                format!("context {} is not entered", self.id)
            };
            return Err(Error::state("Context::leave", message));
        }
        self.depth.set(self.depth.get() - 1);
        debug!(context = %self.id, depth = self.depth.get(), "left context");

        match &self.lock {
            ContextLock::Borrowed(locker) if !locker.entered() => Err(Error::state(
                "Context::leave",
                "lock must be released after leaving context",
            )),
            ContextLock::Owned(locker) if !self.entered() && locker.entered() => {
                locker.release("Context::leave")
            }
            _ => Ok(()),
        }
    }

    /// Enter now and leave when the returned guard drops
    pub fn scope(&self) -> Result<ContextScope<'_, 'a>> {
        self.enter()?;
        Ok(ContextScope {
            context: self,
            active: true,
        })
    }

    /// Check `source` with the engine without running it
    pub fn compile(&self, source: &str) -> Result<Script> {
        self.compile_with_origin(source, None)
    }

    /// Compile with a resource name and position for stack traces
    pub fn compile_with_origin(
        &self,
        source: &str,
        origin: Option<ScriptOrigin>,
    ) -> Result<Script> {
        let script = Script::new(source, origin);
        self.runtime.engine().compile(&script)?;
        Ok(script)
    }

    /// Compile and run `source`; the context must be current
    pub fn eval(&self, source: &str) -> Result<Value> {
        let script = self.compile(source)?;
        self.run(&script)
    }

    /// Like [`eval`](Self::eval), attributing the source to `origin`
    pub fn eval_with_origin(&self, source: &str, origin: ScriptOrigin) -> Result<Value> {
        let script = self.compile_with_origin(source, Some(origin))?;
        self.run(&script)
    }

    /// Run a compiled script; the context must be current
    pub fn run(&self, script: &Script) -> Result<Value> {
        if !self.is_current() {
            return Err(Error::state(
                "Context::run",
                format!("context {} is not the current context", self.id),
            ));
        }
        let scope = ExecutionScope {
            isolate: self.isolate,
            context: self.id,
            global: &self.global,
            extensions: &self.extensions,
        };
        let value = self.runtime.engine().execute(&scope, script)?;
        Ok(value)
    }
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("id", &self.id)
            .field("isolate", &self.isolate)
            .field("extensions", &self.enabled_extensions())
            .field("depth", &self.depth.get())
            .finish()
    }
}

impl Drop for Context<'_> {
    fn drop(&mut self) {
        while self.entered() {
            if let Err(err) = self.leave() {
                let removed = entry_stack::remove(self.runtime.id(), Entry::Context(self.id));
                self.depth.set(0);
                warn!(context = %self.id, removed, %err, "dropped context was not left in order");
                break;
            }
        }
    }
}

/// Keeps a context entered until dropped.
///
/// Dereferences to the context, so scripts can run through the scope.
#[must_use = "the context is left as soon as the scope is dropped"]
pub struct ContextScope<'c, 'a> {
    context: &'c Context<'a>,
    active: bool,
}

impl ContextScope<'_, '_> {
    /// Leave now, reporting ordering errors
    pub fn finish(mut self) -> Result<()> {
        self.active = false;
        self.context.leave()
    }
}

impl<'a> Deref for ContextScope<'_, 'a> {
    type Target = Context<'a>;

    fn deref(&self) -> &Self::Target {
        self.context
    }
}

impl Drop for ContextScope<'_, '_> {
    fn drop(&mut self) {
        if self.active {
            if let Err(err) = self.context.leave() {
                warn!(context = %self.context.id, %err, "implicit context leave failed");
            }
        }
    }
}
