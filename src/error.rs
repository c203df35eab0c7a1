use thiserror::Error;

/// Errors returned by the storage engine.
///
/// After a failed mutating call the on-disk state may be partially updated,
/// callers that need consistency must inspect the filesystem themselves.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum FsError {
    /// the device does not hold a filesystem this engine can mount
    #[error("bad filesystem format: {0}")]
    Format(String),
    /// the block bitmap, the inode table or a directory block is exhausted
    #[error("no space left: {0}")]
    NoSpace(&'static str),
    #[error("device I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unsupported mode {0:#o}, expected a regular file or a directory")]
    InvalidMode(u32),
    #[error("invalid argument: {0}")]
    Validation(String),
    /// on-disk bytes that fail decoding or range checks
    #[error("corrupted metadata: {0}")]
    Corrupted(String),
}

pub type Result<T> = std::result::Result<T, FsError>;
