//! Engine platform lifecycle

use std::sync::atomic::{AtomicBool, Ordering};

use core_types::{Error, Result};
use tracing::info;

/// The engine platform a runtime is built on.
///
/// Initialized once before any isolate exists and disposed after the last
/// one is gone.
#[derive(Debug, Default)]
pub struct Platform {
    initialized: AtomicBool,
}

impl Platform {
    /// An uninitialized platform
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring the platform up; fails if it already is
    pub fn initialize(&self) -> Result<()> {
        if self.initialized.swap(true, Ordering::AcqRel) {
            return Err(Error::state(
                "Platform::initialize",
                "platform is already initialized",
            ));
        }
        info!("platform initialized");
        Ok(())
    }

    /// Tear the platform down; returns whether it was up
    pub fn dispose(&self) -> bool {
        let was_up = self.initialized.swap(false, Ordering::AcqRel);
        if was_up {
            info!("platform disposed");
        }
        was_up
    }

    /// Whether the platform is up
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }
}
