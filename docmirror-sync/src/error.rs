//! Error types for docmirror-sync.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while bringing a mirror up to date.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// A git operation failed, annotated with the mirror it ran against.
    #[error("git {op} failed at {path}: {source}")]
    Git {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: git2::Error,
    },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`MirrorError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> MirrorError {
    MirrorError::Io {
        path: path.into(),
        source,
    }
}

/// Convenience constructor for [`MirrorError::Git`].
pub(crate) fn git_err(
    op: &'static str,
    path: impl Into<PathBuf>,
    source: git2::Error,
) -> MirrorError {
    MirrorError::Git {
        op,
        path: path.into(),
        source,
    }
}
