use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    // Request
    #[error("search root does not exist: {0}")]
    RootNotFound(PathBuf),

    #[error("search root is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("keyword is empty")]
    EmptyKeyword,

    // Per-file
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    #[error("path not found: {0}")]
    NotFound(PathBuf),

    #[error("symlink loop at {0}")]
    SymlinkLoop(PathBuf),

    #[error("binary content in {0}")]
    Binary(PathBuf),

    #[error("IO error at {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Session
    #[error("walk failed: {0}")]
    Walk(String),

    #[error("could not start search worker")]
    Spawn(#[source] std::io::Error),

    #[error("search worker panicked")]
    WorkerPanicked,
}

impl SearchError {
    /// Classify an I/O failure on `path` into the matching per-file variant.
    pub(crate) fn from_io(path: PathBuf, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            _ => Self::Io { path, source: err },
        }
    }

    /// The path this error occurred at, if applicable.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::RootNotFound(p)
            | Self::NotADirectory(p)
            | Self::PermissionDenied(p)
            | Self::NotFound(p)
            | Self::SymlinkLoop(p)
            | Self::Binary(p)
            | Self::Io { path: p, .. } => Some(p),
            _ => None,
        }
    }

    /// Whether the scan can continue after this error.
    ///
    /// Recoverable errors concern a single file or subtree: the file is
    /// treated as a non-match and the walk keeps going. Everything else is
    /// either a rejected request or ends the session as `Failed`.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied(_)
                | Self::NotFound(_)
                | Self::SymlinkLoop(_)
                | Self::Binary(_)
                | Self::Io { .. }
        )
    }
}
