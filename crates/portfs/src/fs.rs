use std::sync::Arc;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::UNLIMITED_SIZE;
use crate::backend::StorageBackend;
use crate::bool_or_error::BoolOrError;
use crate::clock::Clock;
use crate::dir_info::{DirInfo, FileInfo, NullProgressNotifier, ProgressNotifier};
use crate::error::{Error, Result};
use crate::file::{File, InputFile, OutputFile};
use crate::message::MessageHandler;
use crate::path_utils;

const READ_CHUNK_SIZE: usize = 8192;

/// The portable filesystem abstraction.
///
/// Wraps a [`StorageBackend`] selected at construction time and supplies
/// the cross-cutting orchestration: parent directories are created before
/// any write-side open, whole-file writes can be published atomically, and
/// named locks get staleness arithmetic.  It holds no state beyond the
/// backend handle, so clones are cheap and interchangeable.
///
/// All operations complete before returning; there is no internal
/// threading, no built-in timeout, and no retry.
#[derive(Clone)]
pub struct FileSystem {
    backend: Arc<dyn StorageBackend>,
}

impl FileSystem {
    /// Creates a filesystem over `backend`.
    pub fn with_backend<B: StorageBackend + 'static>(backend: B) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Creates a filesystem over an already shared backend.
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    // Parent-directory funnel for every write-side open and for rename
    // destinations.  A failure here is reported but not returned; the
    // subsequent backend call surfaces the real error.
    async fn setup_file_dir(&self, path: &str, handler: &dyn MessageHandler) {
        if let Some(parent) = path_utils::parent(path) {
            let _ = self.recursively_make_dir(parent, handler).await;
        }
    }

    /// Opens `path` for reading.
    pub async fn open_input(
        &self,
        path: &str,
        handler: &dyn MessageHandler,
    ) -> Result<Box<dyn InputFile>> {
        self.backend.open_input(path, handler).await
    }

    /// Opens `path` for writing, creating missing parent directories first.
    pub async fn open_output(
        &self,
        path: &str,
        handler: &dyn MessageHandler,
    ) -> Result<Box<dyn OutputFile>> {
        self.setup_file_dir(path, handler).await;
        self.backend.open_output(path, false, handler).await
    }

    /// Opens `path` for appending, creating missing parent directories
    /// first.
    pub async fn open_output_for_append(
        &self,
        path: &str,
        handler: &dyn MessageHandler,
    ) -> Result<Box<dyn OutputFile>> {
        self.setup_file_dir(path, handler).await;
        self.backend.open_output(path, true, handler).await
    }

    /// Opens a uniquely named temp file starting with `prefix`, creating
    /// missing parent directories first.  On success the generated name is
    /// available through [`File::filename`].
    pub async fn open_temp(
        &self,
        prefix: &str,
        handler: &dyn MessageHandler,
    ) -> Result<Box<dyn OutputFile>> {
        self.setup_file_dir(prefix, handler).await;
        self.backend.open_temp(prefix, handler).await
    }

    /// Closes `file`, consuming the handle.  All resource release funnels
    /// through here; a handle is closed exactly once.
    pub async fn close<F: File + ?Sized>(
        &self,
        file: Box<F>,
        handler: &dyn MessageHandler,
    ) -> Result<()> {
        file.close(handler).await
    }

    /// Reads the entire content of `path`, failing without partial data if
    /// it exceeds `max_size` bytes.  [`UNLIMITED_SIZE`] disables the cap.
    pub async fn read_file(
        &self,
        path: &str,
        max_size: i64,
        handler: &dyn MessageHandler,
    ) -> Result<Vec<u8>> {
        let file = self.open_input(path, handler).await?;
        self.read_open_file(file, max_size, handler).await
    }

    /// As [`FileSystem::read_file`], for an already-open handle.  The
    /// handle is closed in all outcomes.
    pub async fn read_open_file(
        &self,
        mut file: Box<dyn InputFile>,
        max_size: i64,
        handler: &dyn MessageHandler,
    ) -> Result<Vec<u8>> {
        let content = file.read_remaining(max_size, handler).await;
        let closed = self.close(file, handler).await;
        let content = content?;
        closed?;
        Ok(content)
    }

    /// Reads the entire content of `path` with no size cap.  Dangerous: an
    /// unexpectedly large file buffers whole in memory.  Prefer
    /// [`FileSystem::read_file`] with a limit whenever the source size is
    /// not under your control.
    pub async fn read_file_unbounded(
        &self,
        path: &str,
        handler: &dyn MessageHandler,
    ) -> Result<Vec<u8>> {
        self.read_file(path, UNLIMITED_SIZE, handler).await
    }

    /// Streams the content of `path` into `sink`, failing once more than
    /// `max_size` bytes have been seen.  On failure the sink may already
    /// have received a prefix of the content.
    pub async fn read_file_to_writer<W>(
        &self,
        path: &str,
        max_size: i64,
        sink: &mut W,
        handler: &dyn MessageHandler,
    ) -> Result<()>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let file = self.open_input(path, handler).await?;
        self.read_open_file_to_writer(file, max_size, sink, handler)
            .await
    }

    /// As [`FileSystem::read_file_to_writer`], for an already-open handle.
    /// The handle is closed in all outcomes.
    pub async fn read_open_file_to_writer<W>(
        &self,
        mut file: Box<dyn InputFile>,
        max_size: i64,
        sink: &mut W,
        handler: &dyn MessageHandler,
    ) -> Result<()>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let mut buf = [0u8; READ_CHUNK_SIZE];
        let mut total: i64 = 0;
        let result = loop {
            let count = file.read(&mut buf, handler).await;
            if count == 0 {
                break Ok(());
            }
            total += count as i64;
            if max_size != UNLIMITED_SIZE && total > max_size {
                handler.error(&format!(
                    "{}: content exceeds limit of {} bytes",
                    file.filename(),
                    max_size
                ));
                break Err(Error::size_limit_exceeded(file.filename(), max_size));
            }
            if let Err(io_err) = sink.write_all(&buf[..count]).await {
                handler.error(&format!(
                    "{}: write to sink failed: {}",
                    file.filename(),
                    io_err
                ));
                break Err(io_err.into());
            }
        };
        let closed = self.close(file, handler).await;
        result?;
        closed
    }

    /// Whole-file write: open (auto-creating parent directories), write,
    /// close.  Not atomic: a failure may leave partial or absent content
    /// visible under `path`.  Use [`FileSystem::write_file_atomic`] when
    /// readers race writers.
    pub async fn write_file(
        &self,
        path: &str,
        content: &[u8],
        handler: &dyn MessageHandler,
    ) -> Result<()> {
        let mut file = self.open_output(path, handler).await?;
        let wrote = file.write(content, handler).await;
        let closed = self.close(file, handler).await;
        wrote.and(closed)
    }

    /// Writes `content` to a fresh uniquely named file starting with
    /// `prefix` and returns the generated filename.  The temp file is
    /// removed best-effort if the write fails.
    pub async fn write_temp_file(
        &self,
        prefix: &str,
        content: &[u8],
        handler: &dyn MessageHandler,
    ) -> Result<String> {
        let mut file = self.open_temp(prefix, handler).await?;
        let temp_name = file.filename().to_string();
        let wrote = file.write(content, handler).await;
        let closed = self.close(file, handler).await;
        if let Err(failure) = wrote.and(closed) {
            let _ = self.backend.remove_file(&temp_name, handler).await;
            return Err(failure);
        }
        Ok(temp_name)
    }

    /// Atomic whole-file publication: writes the full content to a temp
    /// file whose name derives from `path`, then renames it over `path`.
    /// A reader racing this sees the complete old content or the complete
    /// new content, never a partial write.
    pub async fn write_file_atomic(
        &self,
        path: &str,
        content: &[u8],
        handler: &dyn MessageHandler,
    ) -> Result<()> {
        let temp_name = self
            .write_temp_file(&format!("{path}.temp"), content, handler)
            .await?;
        self.rename(&temp_name, path, handler).await
    }

    /// Like POSIX mv, except missing parent directories of `to` are created
    /// first.
    pub async fn rename(&self, from: &str, to: &str, handler: &dyn MessageHandler) -> Result<()> {
        self.setup_file_dir(to, handler).await;
        self.backend.rename(from, to, handler).await
    }

    /// Like POSIX rm.
    pub async fn remove_file(&self, path: &str, handler: &dyn MessageHandler) -> Result<()> {
        self.backend.remove_file(path, handler).await
    }

    /// Like POSIX mkdir: non-recursive, fails if the parent is missing.
    pub async fn make_dir(&self, path: &str, handler: &dyn MessageHandler) -> Result<()> {
        self.backend.make_dir(path, handler).await
    }

    /// Like POSIX rmdir: removes `path` only if it is an empty directory.
    pub async fn remove_dir(&self, path: &str, handler: &dyn MessageHandler) -> Result<()> {
        self.backend.remove_dir(path, handler).await
    }

    /// Like `mkdir -p`: creates every missing ancestor of `path`, then
    /// `path` itself.
    pub async fn recursively_make_dir(
        &self,
        path: &str,
        handler: &dyn MessageHandler,
    ) -> Result<()> {
        for prefix in path_utils::ancestors(path) {
            match self.backend.exists(prefix, handler).await {
                BoolOrError::False => self.backend.make_dir(prefix, handler).await?,
                BoolOrError::True => {
                    if self.backend.is_dir(prefix, handler).await.is_false() {
                        handler.error(&format!("{prefix} exists and is not a directory"));
                        return Err(Error::not_a_directory(prefix));
                    }
                }
                BoolOrError::Error => {
                    handler.error(&format!("could not determine whether {prefix} exists"));
                    return Err(Error::indeterminate(format!("existence of {prefix}")));
                }
            }
        }
        Ok(())
    }

    /// Like `test -e`.
    pub async fn exists(&self, path: &str, handler: &dyn MessageHandler) -> BoolOrError {
        self.backend.exists(path, handler).await
    }

    /// Like `test -d`.
    pub async fn is_dir(&self, path: &str, handler: &dyn MessageHandler) -> BoolOrError {
        self.backend.is_dir(path, handler).await
    }

    /// Non-recursive listing of the full paths of `dir`'s entries.  Not
    /// safe against concurrent mutation of `dir`; serialize externally if
    /// you need that.
    pub async fn list_contents(
        &self,
        dir: &str,
        handler: &dyn MessageHandler,
    ) -> Result<Vec<String>> {
        self.backend.list_contents(dir, handler).await
    }

    /// Seconds since epoch of the last access to `path`.
    pub async fn atime(&self, path: &str, handler: &dyn MessageHandler) -> Result<i64> {
        self.backend.atime(path, handler).await
    }

    /// Seconds since epoch of the last content modification of `path`.
    pub async fn mtime(&self, path: &str, handler: &dyn MessageHandler) -> Result<i64> {
        self.backend.mtime(path, handler).await
    }

    /// Size of `path` in bytes.
    pub async fn size(&self, path: &str, handler: &dyn MessageHandler) -> Result<i64> {
        self.backend.size(path, handler).await
    }

    /// Maximum possible length of a path under `base`.
    pub fn max_path_length(&self, base: &str) -> usize {
        self.backend.max_path_length(base)
    }

    /// Aggregates everything under directory `path` (which must not end in
    /// a separator): per-file metadata, cumulative size and entry count,
    /// and the full paths of empty directories.
    ///
    /// The walk assumes no cyclic links; a cycle makes it non-terminating.
    /// Mutation racing the walk yields a best-effort snapshot.  A listing
    /// failure mid-walk has been reported to `handler` and leaves a partial
    /// aggregation.
    pub async fn get_dir_info(&self, path: &str, handler: &dyn MessageHandler) -> DirInfo {
        let mut notifier = NullProgressNotifier;
        self.get_dir_info_with_progress(path, &mut notifier, handler)
            .await
    }

    /// As [`FileSystem::get_dir_info`], invoking `notifier` for every entry
    /// processed so very large trees can report liveness.
    pub async fn get_dir_info_with_progress(
        &self,
        path: &str,
        notifier: &mut dyn ProgressNotifier,
        handler: &dyn MessageHandler,
    ) -> DirInfo {
        debug_assert!(!path.ends_with('/'), "path must not end in a separator");
        let mut info = DirInfo::new();
        let mut pending = vec![path.to_string()];
        while let Some(dir) = pending.pop() {
            let entries = match self.backend.list_contents(&dir, handler).await {
                Ok(entries) => entries,
                // Reported by the backend; keep whatever we aggregated.
                Err(_) => continue,
            };
            if entries.is_empty() {
                info.empty_dirs.push(dir);
                continue;
            }
            for entry in entries {
                notifier.notify();
                info.inode_count += 1;
                if self.backend.is_dir(&entry, handler).await.is_true() {
                    pending.push(entry);
                } else {
                    let size = self.backend.size(&entry, handler).await.unwrap_or(0);
                    let atime = self.backend.atime(&entry, handler).await.unwrap_or(0);
                    info.size_bytes += size;
                    info.files.push(FileInfo::new(size, atime, entry));
                }
            }
        }
        info
    }

    /// Attempts to atomically claim the cross-process lock `lock_name`
    /// (a storage path not otherwise used for content).  True: claimed;
    /// call [`FileSystem::unlock`] when done.  False: somebody else holds
    /// it; retrying is the caller's decision.  Error: the attempt could not
    /// be evaluated.
    ///
    /// No lock object is returned and none exists in this process: the name
    /// is the sole handle, and lock state is observed fresh from the
    /// backend on every call.  That is what lets a lock outlive process
    /// restarts.
    pub async fn try_lock(&self, lock_name: &str, handler: &dyn MessageHandler) -> BoolOrError {
        self.backend.try_lock(lock_name, handler).await
    }

    /// Like [`FileSystem::try_lock`], but may break a lock whose claim was
    /// last made or refreshed more than `timeout_millis` ago as measured by
    /// `clock`.  A lock obtained through here is best-effort: there is no
    /// guarantee the previous holder has stopped working.  Backends that do
    /// not support breaking fall back to plain `try_lock`.
    pub async fn try_lock_with_timeout(
        &self,
        lock_name: &str,
        timeout_millis: i64,
        clock: &dyn Clock,
        handler: &dyn MessageHandler,
    ) -> BoolOrError {
        self.backend
            .try_lock_with_timeout(lock_name, timeout_millis, clock, handler)
            .await
    }

    /// Refreshes the claim timestamp of a lock the caller holds.  Bump
    /// often enough while working and a timeout-based breaker will not
    /// pre-empt you.
    pub async fn bump_lock_timeout(
        &self,
        lock_name: &str,
        handler: &dyn MessageHandler,
    ) -> Result<()> {
        self.backend.bump_lock_timeout(lock_name, handler).await
    }

    /// Releases a held lock.  Failure (for example, another party altered
    /// permissions on the lock path) is reported and returned; the caller
    /// might try again or move to a different lock name.  Calling this
    /// without holding `lock_name` is undefined.
    pub async fn unlock(&self, lock_name: &str, handler: &dyn MessageHandler) -> Result<()> {
        self.backend.unlock(lock_name, handler).await
    }
}

impl std::fmt::Debug for FileSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FileSystem{{}}")
    }
}
