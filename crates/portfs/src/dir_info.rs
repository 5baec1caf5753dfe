/// Metadata for one regular file found during a subtree walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub size_bytes: i64,
    pub atime_sec: i64,
    pub name: String,
}

impl FileInfo {
    pub fn new(size_bytes: i64, atime_sec: i64, name: impl Into<String>) -> Self {
        Self {
            size_bytes,
            atime_sec,
            name: name.into(),
        }
    }
}

/// Accumulated result of one directory-subtree walk.
///
/// A single mutable accumulator: build it with one traversal, read it, drop
/// it.  It is not synchronized, and a walk racing mutation of the same
/// subtree yields a best-effort snapshot with no cross-traversal
/// consistency.
#[derive(Debug, Default)]
pub struct DirInfo {
    /// Every regular file found, with full paths.
    pub files: Vec<FileInfo>,
    /// Full paths of directories found to contain zero entries.
    pub empty_dirs: Vec<String>,
    /// Cumulative size of all files found.
    pub size_bytes: i64,
    /// Cumulative count of entries (files and directories) found.
    pub inode_count: i64,
}

impl DirInfo {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Callback invoked while a traversal is making forward progress, so very
/// large trees can report liveness.
pub trait ProgressNotifier: Send {
    fn notify(&mut self);
}

/// Notifier that ignores progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgressNotifier;

impl ProgressNotifier for NullProgressNotifier {
    fn notify(&mut self) {}
}
