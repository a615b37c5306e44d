//! # docmirror-renderer
//!
//! Starts the documentation server over the mirror root and keeps it running
//! until shutdown. Anything implementing [`ManagedProcess`] can stand in for
//! it in the runtime.

pub mod error;
pub mod process;

pub use error::RendererError;
pub use process::{
    ManagedProcess, Renderer, RendererOptions, DEFAULT_BINARY, DEFAULT_INDEX_INTERVAL,
    DEFAULT_PORT,
};
