//! # docmirror-sync
//!
//! Local mirror management.
//!
//! [`MirrorManager::sync`] decides between an initial clone and an update of
//! an existing working copy; the actual git work sits behind
//! [`MirrorTransport`], implemented for production by [`GitTransport`].

pub mod error;
pub mod git;
pub mod manager;

pub use error::MirrorError;
pub use git::{GitTransport, DEFAULT_FETCH_DEPTH};
pub use manager::{MirrorManager, MirrorOutcome, MirrorTransport};
