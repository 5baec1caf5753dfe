use async_trait::async_trait;

use crate::bool_or_error::BoolOrError;
use crate::clock::Clock;
use crate::error::Result;
use crate::file::{InputFile, OutputFile};
use crate::message::MessageHandler;

/// Contract every concrete storage backend must satisfy.
///
/// The orchestration layer ([`crate::fs::FileSystem`]) builds the
/// cross-cutting guarantees (auto-mkdir, atomic publication, lock-timeout
/// arithmetic, subtree aggregation) out of these primitives.  Primitives
/// that create under a path (`open_output`, `open_temp`, and the
/// destination side of `rename`) may assume the parent directory already
/// exists; the orchestration layer guarantees it before delegating.
///
/// Backends report every failure to the supplied [`MessageHandler`] before
/// returning it.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Open `path` for reading.
    async fn open_input(
        &self,
        path: &str,
        handler: &dyn MessageHandler,
    ) -> Result<Box<dyn InputFile>>;

    /// Open `path` for writing, truncating existing content, or appending
    /// to it when `append` is set.
    async fn open_output(
        &self,
        path: &str,
        append: bool,
        handler: &dyn MessageHandler,
    ) -> Result<Box<dyn OutputFile>>;

    /// Open a uniquely named file starting with `prefix` for writing.  The
    /// generated name is discoverable through the handle.
    async fn open_temp(
        &self,
        prefix: &str,
        handler: &dyn MessageHandler,
    ) -> Result<Box<dyn OutputFile>>;

    /// Like POSIX rm.
    async fn remove_file(&self, path: &str, handler: &dyn MessageHandler) -> Result<()>;

    /// Durable rename of `from` onto `to`.  This primitive is what makes
    /// atomic publication possible: a reader of `to` sees the old content
    /// or the new content in full, never a mixture.
    async fn rename(&self, from: &str, to: &str, handler: &dyn MessageHandler) -> Result<()>;

    /// Like POSIX mkdir: non-recursive, fails if the parent is missing or
    /// `path` already exists.
    async fn make_dir(&self, path: &str, handler: &dyn MessageHandler) -> Result<()>;

    /// Like POSIX rmdir: removes `path` only if it is an empty directory.
    async fn remove_dir(&self, path: &str, handler: &dyn MessageHandler) -> Result<()>;

    /// Like `test -e`.
    async fn exists(&self, path: &str, handler: &dyn MessageHandler) -> BoolOrError;

    /// Like `test -d`.
    async fn is_dir(&self, path: &str, handler: &dyn MessageHandler) -> BoolOrError;

    /// Non-recursive listing of the full paths of `dir`'s entries, omitting
    /// `.` and `..`.  Succeeds with an empty vec for an existing empty
    /// directory.  Not safe against concurrent mutation of `dir`; callers
    /// needing that serialize externally.
    async fn list_contents(&self, dir: &str, handler: &dyn MessageHandler)
    -> Result<Vec<String>>;

    /// Seconds since epoch of the last access to `path`.
    async fn atime(&self, path: &str, handler: &dyn MessageHandler) -> Result<i64>;

    /// Seconds since epoch of the last content modification of `path`.
    async fn mtime(&self, path: &str, handler: &dyn MessageHandler) -> Result<i64>;

    /// Size of `path` in bytes.  Behavior is undefined if `path` is a
    /// directory.
    async fn size(&self, path: &str, handler: &dyn MessageHandler) -> Result<i64>;

    /// Atomically claim the named lock.  The claim must be an
    /// exclusive-create at the storage level, never a check-then-create.
    ///
    /// True: claimed; call `unlock` when done.  False: somebody else holds
    /// it.  Error: the attempt itself could not be evaluated.
    async fn try_lock(&self, lock_name: &str, handler: &dyn MessageHandler) -> BoolOrError;

    /// Like `try_lock`, but the backend may break a lock whose claim was
    /// last made or refreshed more than `timeout_millis` ago as measured by
    /// `clock`.  Breaking gives no guarantee the previous holder stopped
    /// working; a lock obtained this way is best-effort only.
    ///
    /// The default never breaks anything and behaves exactly like
    /// `try_lock`.  A backend overriding this must override
    /// `bump_lock_timeout` as well, or long-running holders have no way to
    /// defend their claim.
    async fn try_lock_with_timeout(
        &self,
        lock_name: &str,
        timeout_millis: i64,
        clock: &dyn Clock,
        handler: &dyn MessageHandler,
    ) -> BoolOrError {
        let _ = (timeout_millis, clock);
        self.try_lock(lock_name, handler).await
    }

    /// Refresh the claim timestamp of a lock the caller holds, so a
    /// long-running holder is not pre-empted by a timeout-based breaker.
    ///
    /// The default does nothing, matching the default
    /// `try_lock_with_timeout`, which never inspects timestamps.
    async fn bump_lock_timeout(&self, lock_name: &str, handler: &dyn MessageHandler) -> Result<()> {
        let _ = (lock_name, handler);
        Ok(())
    }

    /// Release a held lock.  Calling this without having claimed
    /// `lock_name` is undefined; that discipline belongs to the caller.
    async fn unlock(&self, lock_name: &str, handler: &dyn MessageHandler) -> Result<()>;

    /// Maximum possible length of a path under `base`.  There may be
    /// further constraints per level.
    fn max_path_length(&self, base: &str) -> usize {
        let _ = base;
        8192
    }
}
