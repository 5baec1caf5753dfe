// Error types for PortFS operations

pub type Result<T> = std::result::Result<T, Error>;

/// Failure taxonomy shared by the orchestration layer and every backend.
///
/// Backends report failures to the message sink at the point they occur and
/// then return one of these; nothing here is ever escalated beyond the call.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("not a directory: {0}")]
    NotADirectory(String),

    #[error("not a regular file: {0}")]
    NotAFile(String),

    #[error("{path}: content exceeds limit of {limit} bytes")]
    SizeLimitExceeded { path: String, limit: i64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("indeterminate: {0}")]
    Indeterminate(String),
}

impl Error {
    pub fn not_found(path: impl Into<String>) -> Self {
        Error::NotFound(path.into())
    }

    pub fn permission_denied(path: impl Into<String>) -> Self {
        Error::PermissionDenied(path.into())
    }

    pub fn already_exists(path: impl Into<String>) -> Self {
        Error::AlreadyExists(path.into())
    }

    pub fn not_a_directory(path: impl Into<String>) -> Self {
        Error::NotADirectory(path.into())
    }

    pub fn not_a_file(path: impl Into<String>) -> Self {
        Error::NotAFile(path.into())
    }

    pub fn size_limit_exceeded(path: impl Into<String>, limit: i64) -> Self {
        Error::SizeLimitExceeded {
            path: path.into(),
            limit,
        }
    }

    pub fn indeterminate(what: impl Into<String>) -> Self {
        Error::Indeterminate(what.into())
    }
}
