use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::UNLIMITED_SIZE;
use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::file::{File, InputFile, OutputFile};
use crate::memory::backend::{Entry, State};
use crate::message::MessageHandler;

/// Read handle over a content snapshot taken at open.
///
/// Snapshotting is what gives each open a consistent instant: a writer
/// racing this handle changes the tree, not the bytes already handed out.
pub(super) struct MemoryInputFile {
    filename: String,
    content: Vec<u8>,
    pos: usize,
}

impl MemoryInputFile {
    pub(super) fn new(filename: &str, content: Vec<u8>) -> Self {
        Self {
            filename: filename.to_string(),
            content,
            pos: 0,
        }
    }
}

#[async_trait]
impl File for MemoryInputFile {
    fn filename(&self) -> &str {
        &self.filename
    }

    async fn close(self: Box<Self>, _handler: &dyn MessageHandler) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl InputFile for MemoryInputFile {
    async fn read(&mut self, buf: &mut [u8], _handler: &dyn MessageHandler) -> usize {
        let remaining = self.content.len() - self.pos;
        let count = buf.len().min(remaining);
        buf[..count].copy_from_slice(&self.content[self.pos..self.pos + count]);
        self.pos += count;
        count
    }

    async fn read_remaining(
        &mut self,
        max_size: i64,
        handler: &dyn MessageHandler,
    ) -> Result<Vec<u8>> {
        let remaining = &self.content[self.pos..];
        if max_size != UNLIMITED_SIZE && remaining.len() as i64 > max_size {
            handler.error(&format!(
                "{}: content exceeds limit of {} bytes",
                self.filename, max_size
            ));
            return Err(Error::size_limit_exceeded(self.filename.as_str(), max_size));
        }
        let content = remaining.to_vec();
        self.pos = self.content.len();
        Ok(content)
    }
}

/// Write handle that publishes every write straight into the shared tree.
///
/// Publication per write, not per close, is deliberate: the non-atomic
/// write contract makes partial content reader-visible, and this handle is
/// where that behavior comes from.
pub(super) struct MemoryOutputFile {
    filename: String,
    state: Arc<Mutex<State>>,
    clock: Arc<dyn Clock>,
}

impl MemoryOutputFile {
    pub(super) fn new(filename: &str, state: Arc<Mutex<State>>, clock: Arc<dyn Clock>) -> Self {
        Self {
            filename: filename.to_string(),
            state,
            clock,
        }
    }
}

#[async_trait]
impl File for MemoryOutputFile {
    fn filename(&self) -> &str {
        &self.filename
    }

    async fn close(self: Box<Self>, _handler: &dyn MessageHandler) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl OutputFile for MemoryOutputFile {
    async fn write(&mut self, buf: &[u8], handler: &dyn MessageHandler) -> Result<()> {
        let mut state = self.state.lock().await;
        match state.entries.get_mut(&self.filename) {
            Some(Entry::File {
                content, mtime_sec, ..
            }) => {
                content.extend_from_slice(buf);
                *mtime_sec = self.clock.now_millis() / 1000;
                Ok(())
            }
            _ => {
                handler.error(&format!("{}: removed while open for write", self.filename));
                Err(Error::not_found(self.filename.as_str()))
            }
        }
    }

    async fn flush(&mut self, _handler: &dyn MessageHandler) -> Result<()> {
        // Writes publish immediately; there is nothing buffered to force.
        Ok(())
    }

    async fn set_world_readable(&mut self, _handler: &dyn MessageHandler) -> Result<()> {
        // No permission model in the in-memory tree.
        Ok(())
    }
}
