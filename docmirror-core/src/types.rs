//! Domain types for tracked repositories.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::paths::mirror_path;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Account or organization that owns a repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RepoOwner(pub String);

impl fmt::Display for RepoOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for RepoOwner {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RepoOwner {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Repository name, unique within its owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RepoName(pub String);

impl fmt::Display for RepoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for RepoName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RepoName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Commit identifier as reported by the hosting API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitSha(pub String);

impl CommitSha {
    /// First seven characters, for log lines.
    pub fn short(&self) -> &str {
        self.0.get(..7).unwrap_or(&self.0)
    }
}

impl fmt::Display for CommitSha {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for CommitSha {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for CommitSha {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Identity of a tracked repository: the `(owner, name)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RepoKey {
    pub owner: RepoOwner,
    pub name: RepoName,
}

impl RepoKey {
    pub fn new(owner: impl Into<RepoOwner>, name: impl Into<RepoName>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepoKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One tracked repository and the head commit last observed for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRecord {
    pub owner: RepoOwner,
    pub name: RepoName,
    /// Transport endpoint used for clone and fetch.
    pub clone_url: String,
    /// Branch the head commit was read from.
    pub default_branch: String,
    pub commit_sha: CommitSha,
    /// Mirror location, always `<root>/src/github.com/<owner>/<name>`.
    pub local_path: PathBuf,
}

impl RepoRecord {
    /// Build a record, deriving `local_path` from the mirror root.
    pub fn new(
        owner: impl Into<RepoOwner>,
        name: impl Into<RepoName>,
        clone_url: impl Into<String>,
        default_branch: impl Into<String>,
        commit_sha: impl Into<CommitSha>,
        mirror_root: &Path,
    ) -> Self {
        let owner = owner.into();
        let name = name.into();
        let local_path = mirror_path(mirror_root, &owner, &name);
        Self {
            owner,
            name,
            clone_url: clone_url.into(),
            default_branch: default_branch.into(),
            commit_sha: commit_sha.into(),
            local_path,
        }
    }

    pub fn key(&self) -> RepoKey {
        RepoKey {
            owner: self.owner.clone(),
            name: self.name.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_display_is_owner_slash_name() {
        assert_eq!(RepoKey::new("ctxswitch", "gdoc").to_string(), "ctxswitch/gdoc");
    }

    #[test]
    fn record_derives_local_path_from_root() {
        let record = RepoRecord::new(
            "ctxswitch",
            "gdoc",
            "https://github.com/ctxswitch/gdoc.git",
            "main",
            "abc1234def",
            Path::new("/srv/goroot"),
        );
        assert_eq!(
            record.local_path,
            PathBuf::from("/srv/goroot/src/github.com/ctxswitch/gdoc")
        );
        assert_eq!(record.key(), RepoKey::new("ctxswitch", "gdoc"));
    }

    #[test]
    fn short_sha_handles_short_input() {
        assert_eq!(CommitSha::from("abc1234def").short(), "abc1234");
        assert_eq!(CommitSha::from("c1").short(), "c1");
    }
}
