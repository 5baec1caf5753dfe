//! In-memory reference backend.
//!
//! The whole tree and the lock table live behind one mutex, which is what
//! makes `try_lock` an exclusive-create rather than a check-then-create:
//! every primitive observes and mutates a single consistent instant.
//! Claims, bumps, and file times are stamped with a construction-injected
//! [`crate::clock::Clock`], so lock-staleness behavior is fully
//! deterministic under a manual clock.

mod backend;
mod file;

pub use backend::MemoryBackend;

use std::sync::Arc;

use crate::clock::SystemClock;
use crate::fs::FileSystem;

/// A filesystem over a fresh [`MemoryBackend`] stamped by the wall clock.
pub fn new_fs() -> FileSystem {
    FileSystem::with_backend(MemoryBackend::new(Arc::new(SystemClock)))
}
