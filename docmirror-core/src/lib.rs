//! docmirror core library: repository records, engine options and errors.
//!
//! - [`types`]: newtypes and [`RepoRecord`]
//! - [`interval`]: [`PollInterval`] parsing
//! - [`options`]: [`SyncOptions`] and [`Credentials`]
//! - [`paths`]: mirror layout under the configured root

pub mod error;
pub mod interval;
pub mod options;
pub mod paths;
pub mod types;

pub use error::ConfigError;
pub use interval::{PollInterval, DEFAULT_POLL_INTERVAL};
pub use options::{Credentials, SyncOptions, DEFAULT_TOPIC};
pub use types::{CommitSha, RepoKey, RepoName, RepoOwner, RepoRecord};
