//! Validated options handed to the synchronization engine.

use std::fmt;
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::interval::PollInterval;

pub const DEFAULT_TOPIC: &str = "godoc";

/// Username and token pair used for the hosting API and the git transport.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub token: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            token: token.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Everything the poll loop needs, checked once at startup.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub credentials: Credentials,
    /// Account or organization to scan. Single value only.
    pub account: String,
    /// Topic label that marks a repository for mirroring.
    pub topic: String,
    pub poll_interval: PollInterval,
    /// Mirrors live under `<mirror_root>/src/github.com`.
    pub mirror_root: PathBuf,
}

impl SyncOptions {
    /// Validate raw option values.
    ///
    /// An empty `token_user` falls back to `account`, matching how personal
    /// access tokens are usually scoped.
    pub fn new(
        token: &str,
        token_user: Option<&str>,
        account: &str,
        topic: &str,
        poll_interval: &str,
        mirror_root: impl Into<PathBuf>,
    ) -> Result<Self, ConfigError> {
        if token.trim().is_empty() {
            return Err(ConfigError::Missing("access token"));
        }
        if account.trim().is_empty() {
            return Err(ConfigError::Missing("account"));
        }
        let topic = if topic.trim().is_empty() {
            DEFAULT_TOPIC
        } else {
            topic.trim()
        };
        let username = match token_user.map(str::trim) {
            Some(user) if !user.is_empty() => user,
            _ => account.trim(),
        };

        Ok(Self {
            credentials: Credentials::new(username, token.trim()),
            account: account.trim().to_string(),
            topic: topic.to_string(),
            poll_interval: PollInterval::parse(poll_interval)?,
            mirror_root: mirror_root.into(),
        })
    }
}
