use std::sync::Arc;

use crate::fs::FileSystem;
use crate::memory::MemoryBackend;
use crate::testing::ManualClock;

mod bulk_io;
mod handles;

/// A filesystem over a memory backend driven by a manual clock.
fn manual_fs() -> (FileSystem, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(1_000));
    let fs = FileSystem::with_backend(MemoryBackend::new(clock.clone()));
    (fs, clock)
}
