use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while scanning host credential paths.
///
/// Missing roots and dangling symlinks are not errors (the scanner skips
/// them); anything here aborts the injection and the container creation that
/// triggered it.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Reading a discovered file failed.
    #[error("failed to read '{}': {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The recursive walk itself failed.
    #[error("failed to walk '{}': {}", .path.display(), .source)]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

pub type Result<T, E = ScanError> = std::result::Result<T, E>;
