//! Error types for docmirror-core.

use thiserror::Error;

/// Errors raised while validating engine options.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The poll interval is not valid duration syntax.
    #[error("invalid poll interval '{input}': {reason}")]
    InvalidDuration { input: String, reason: String },

    /// The poll interval parsed but is zero or negative.
    #[error("poll interval must be positive, got '{input}'")]
    NonPositiveInterval { input: String },

    /// A required option was empty.
    #[error("missing required option: {0}")]
    Missing(&'static str),
}
