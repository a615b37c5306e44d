//! # docmirror-discovery
//!
//! Finds labelled repositories on the hosting API and resolves the head
//! commit of each default branch.
//!
//! The scheduler talks to a [`RepositorySource`]; [`GitHubClient`] is the
//! production implementation. [`discover`] runs a complete listing plus head
//! resolution pass and is what one-shot callers use.

pub mod error;
pub mod github;
pub mod source;

pub use error::DiscoveryError;
pub use github::{search_query, GitHubClient, DEFAULT_API_URL, LANGUAGE_FILTER};
pub use source::{discover, DiscoveredRepository, Discovery, RemoteRepository, RepositorySource};
