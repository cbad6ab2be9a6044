use std::path::PathBuf;

/// Represents all possible errors that can occur in this crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error occurred while reading data from procfs.
    #[error("Failed to read procfs info: {0}")]
    ProcfsReadFailed(#[from] procfs::ProcError),

    /// Error occurred while reading a kernel table or writing a log file.
    #[error("I/O failed on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The filesystem notification backend failed.
    #[error("Failed to watch directory: {0}")]
    WatchFailed(#[from] notify::Error),

    /// A polling cycle panicked or was cancelled by the runtime.
    #[error("Polling cycle aborted: {0}")]
    CycleAborted(#[from] tokio::task::JoinError),

    /// The path is invalid.
    #[error("Path is invalid: {0}")]
    InvalidPath(PathBuf),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
