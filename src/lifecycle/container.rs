//! Process-wide container cache.
//!
//! # Responsibilities
//! - Hold the one `Registry` shared by everything in the process
//! - Build it lazily on first use
//! - Clear it between executions (`reset`)
//!
//! # Design Decisions
//! - A single `Mutex` guards both the slot and `reset`, so a reset
//!   happens-before any later `get_or_init`
//! - The registry is built while the lock is held; concurrent callers
//!   never see a half-built instance
//! - Poisoned locks are recovered: every operation leaves the slot valid

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::Result;
use crate::registry::Registry;

static CONTAINER: Mutex<Option<Arc<Registry>>> = Mutex::new(None);

fn slot() -> MutexGuard<'static, Option<Arc<Registry>>> {
    CONTAINER.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Cached registry, building it with `init` if the cache is empty.
///
/// A failed build leaves the cache empty.
pub fn get_or_init<F>(init: F) -> Result<Arc<Registry>>
where
    F: FnOnce() -> Result<Registry>,
{
    let mut slot = slot();
    if let Some(registry) = slot.as_ref() {
        return Ok(Arc::clone(registry));
    }
    let registry = Arc::new(init()?);
    *slot = Some(Arc::clone(&registry));
    tracing::debug!("Container registry created");
    Ok(registry)
}

/// Cached registry, if any.
pub fn current() -> Option<Arc<Registry>> {
    slot().clone()
}

/// Install `registry`, returning the one it displaced.
pub fn replace(registry: Arc<Registry>) -> Option<Arc<Registry>> {
    slot().replace(registry)
}

/// Drop the cached registry. Returns true if one was cached.
///
/// Holders of an `Arc` from before the reset keep a working registry;
/// only later lookups see the new one.
pub fn reset() -> bool {
    let cleared = slot().take().is_some();
    if cleared {
        tracing::debug!("Container cache cleared");
    }
    cleared
}
