#![allow(missing_docs)]

//! PortFS - a portable filesystem abstraction layer
//!
//! One contract ([`StorageBackend`]) that every storage backend must satisfy,
//! and one orchestration layer ([`FileSystem`]) that supplies the
//! cross-cutting guarantees on top of it: atomic publication of written
//! data, automatic creation of parent directories, best-effort named locks
//! with staleness recovery, and whole-subtree aggregation.
//!
//! Set PORTFS_LOG to control logging:
//! - PORTFS_LOG=off (default) - silent
//! - PORTFS_LOG=info - basic operations
//! - PORTFS_LOG=debug - detailed diagnostics

// Tri-state answer for backend state queries
pub mod bool_or_error;

// Closed error taxonomy
pub mod error;

// Diagnostics sink contract
pub mod message;

// Time source for lock-timeout arithmetic
pub mod clock;

// Open-handle traits
pub mod file;

// Backend contract
pub mod backend;

// Orchestration layer
pub mod fs;

// Directory aggregation records and progress callbacks
pub mod dir_info;

// Separator-based path arithmetic
pub mod path_utils;

// Reference in-memory backend
pub mod memory;

// Deterministic fixtures (manual clock, capturing sink)
pub mod testing;

#[cfg(test)]
mod tests;

// Re-export key types
pub use backend::StorageBackend;
pub use bool_or_error::BoolOrError;
pub use clock::{Clock, SystemClock};
pub use dir_info::{DirInfo, FileInfo, NullProgressNotifier, ProgressNotifier};
pub use error::{Error, Result};
pub use file::{File, InputFile, OutputFile};
pub use fs::FileSystem;
pub use message::{EmitMessageHandler, MessageHandler, NullMessageHandler, Severity};

/// Sentinel accepted by size-capped reads to mean "no limit".
///
/// This is documented as -1 in user-facing documentation, so don't change it.
pub const UNLIMITED_SIZE: i64 = -1;
