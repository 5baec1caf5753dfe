use async_trait::async_trait;

use crate::error::Result;
use crate::message::MessageHandler;

/// An open backend resource.
///
/// Handles are owned boxes.  The only sanctioned way to release the
/// underlying resource is [`crate::fs::FileSystem::close`], which consumes
/// the handle; once closed, the handle is gone and cannot be misused.
/// Dropping a handle without closing it releases memory but makes no promise
/// about buffered data.
#[async_trait]
pub trait File: Send {
    /// The name this handle was opened under.  Stable for the handle's
    /// lifetime; for temp files this is where the generated name is
    /// discovered.
    fn filename(&self) -> &str;

    /// Release the underlying resource.  Reached through
    /// [`crate::fs::FileSystem::close`] so that closing stays centralized.
    async fn close(self: Box<Self>, handler: &dyn MessageHandler) -> Result<()>;
}

/// A handle opened for reading.
#[async_trait]
pub trait InputFile: File {
    /// Read up to `buf.len()` bytes, returning the count actually read.
    /// Short reads are legal and are not an error; zero means end of
    /// content.  Failures are reported to `handler` and surface as a zero
    /// count.
    async fn read(&mut self, buf: &mut [u8], handler: &dyn MessageHandler) -> usize;

    /// Read all remaining content.  Fails, returning no partial data, if
    /// the remaining content exceeds `max_size` bytes.
    ///
    /// Passing [`crate::UNLIMITED_SIZE`] disables the cap.  That is
    /// dangerous when the source size is not under your control: the whole
    /// content is buffered in memory.
    async fn read_remaining(
        &mut self,
        max_size: i64,
        handler: &dyn MessageHandler,
    ) -> Result<Vec<u8>>;
}

/// A handle opened for writing or appending.
#[async_trait]
pub trait OutputFile: File {
    /// Write `buf`.  Not atomic: a failure part-way through leaves the
    /// destination in an indeterminate, reader-visible state.
    async fn write(&mut self, buf: &[u8], handler: &dyn MessageHandler) -> Result<()>;

    /// Force buffered data to the backend.
    async fn flush(&mut self, handler: &dyn MessageHandler) -> Result<()>;

    /// Mark the file readable by everyone.  A separate explicit step, never
    /// implied by write or close.
    async fn set_world_readable(&mut self, handler: &dyn MessageHandler) -> Result<()>;
}
