use std::path::PathBuf;

use thiserror::Error;

/// Error surface for the scheduler and process runtime.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("discovery error: {0}")]
    Discovery(#[from] docmirror_discovery::DiscoveryError),

    #[error("mirror error: {0}")]
    Mirror(#[from] docmirror_sync::MirrorError),

    #[error("renderer error: {0}")]
    Renderer(#[from] docmirror_renderer::RendererError),

    #[error("{0} task failed to complete")]
    Task(String),

    #[error("signal handler failed: {0}")]
    Signal(#[source] std::io::Error),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> DaemonError {
    DaemonError::Io {
        path: path.into(),
        source,
    }
}
