//! Error types for docmirror-renderer.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RendererError {
    #[error("renderer index interval {input:?} is invalid: {reason}")]
    InvalidIndexInterval { input: String, reason: String },

    #[error("renderer executable {binary:?} not found: {source}")]
    NotFound {
        binary: PathBuf,
        #[source]
        source: which::Error,
    },

    #[error("failed to start renderer {binary}: {source}")]
    Spawn {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed waiting on renderer: {0}")]
    Wait(#[source] std::io::Error),

    #[error("renderer exited with {status}")]
    Exited { status: ExitStatus },
}
