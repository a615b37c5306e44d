//! The discovery seam used by the scheduler.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use docmirror_core::types::{CommitSha, RepoKey, RepoName, RepoOwner, RepoRecord};

use crate::error::DiscoveryError;

/// A repository as returned by the listing call, before its head is known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRepository {
    pub owner: RepoOwner,
    pub name: RepoName,
    pub clone_url: String,
    pub default_branch: String,
}

impl RemoteRepository {
    pub fn key(&self) -> RepoKey {
        RepoKey {
            owner: self.owner.clone(),
            name: self.name.clone(),
        }
    }

    /// Attach the resolved head and place the mirror under `mirror_root`.
    pub fn into_record(self, commit_sha: CommitSha, mirror_root: &Path) -> RepoRecord {
        RepoRecord::new(
            self.owner,
            self.name,
            self.clone_url,
            self.default_branch,
            commit_sha,
            mirror_root,
        )
    }
}

/// Source of labelled repositories and their default-branch heads.
///
/// Listing is one call per cycle; head resolution is one call per
/// repository and dominates API usage.
#[async_trait]
pub trait RepositorySource: Send + Sync {
    /// List every repository carrying the label under the account.
    async fn list_repositories(&self) -> Result<Vec<RemoteRepository>, DiscoveryError>;

    /// Resolve the current head commit of `repo`'s default branch.
    async fn resolve_head(&self, repo: &RemoteRepository) -> Result<CommitSha, DiscoveryError>;
}

/// One listed repository and the outcome of resolving its head.
#[derive(Debug)]
pub struct DiscoveredRepository {
    pub repo: RemoteRepository,
    pub head: Result<CommitSha, DiscoveryError>,
}

/// Result of a full discovery pass, in listing order.
#[derive(Debug, Default)]
pub struct Discovery {
    pub entries: Vec<DiscoveredRepository>,
}

impl Discovery {
    pub fn failed_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.head.is_err()).count()
    }
}

/// List repositories and resolve each head in turn.
///
/// A listing failure aborts the pass. A failed head resolution is recorded
/// on its entry and the pass continues with the next repository.
pub async fn discover<S>(source: &S) -> Result<Discovery, DiscoveryError>
where
    S: RepositorySource + ?Sized,
{
    let repos = source.list_repositories().await?;
    let mut entries = Vec::with_capacity(repos.len());
    for repo in repos {
        let head = source.resolve_head(&repo).await;
        if let Err(err) = &head {
            tracing::warn!(repo = %repo.key(), error = %err, "unable to resolve head commit");
        }
        entries.push(DiscoveredRepository { repo, head });
    }
    Ok(Discovery { entries })
}
