//! libgit2-backed [`MirrorTransport`].
//!
//! Both clone and update authenticate with the configured username and token
//! as plaintext basic credentials and fetch a single commit of history by
//! default. Mirrors are read-only, so an update moves the local branch straight
//! to the fetched head and force-checks it out.

use std::fs;

use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{Cred, CredentialType, FetchOptions, RemoteCallbacks, Repository};

use docmirror_core::types::RepoRecord;
use docmirror_core::Credentials;

use crate::error::{git_err, io_err, MirrorError};
use crate::manager::{MirrorOutcome, MirrorTransport};

pub const DEFAULT_FETCH_DEPTH: i32 = 1;
const REMOTE: &str = "origin";

#[derive(Debug, Clone)]
pub struct GitTransport {
    credentials: Credentials,
    depth: Option<i32>,
}

impl GitTransport {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            depth: Some(DEFAULT_FETCH_DEPTH),
        }
    }

    /// Override the fetch depth. `None` fetches full history, which local
    /// path remotes require: libgit2's local transport cannot fetch shallow.
    pub fn with_depth(mut self, depth: Option<i32>) -> Self {
        self.depth = depth;
        self
    }

    fn fetch_options(&self) -> FetchOptions<'_> {
        let mut callbacks = RemoteCallbacks::new();
        let mut attempts = 0u8;
        callbacks.credentials(move |_url, _username_from_url, allowed| {
            // libgit2 asks again after a 401; the same token will not fare better.
            attempts += 1;
            if attempts > 1 {
                return Err(git2::Error::from_str("credentials rejected by remote"));
            }
            if !allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
                return Err(git2::Error::from_str(
                    "remote does not accept username/token credentials",
                ));
            }
            Cred::userpass_plaintext(&self.credentials.username, &self.credentials.token)
        });

        let mut options = FetchOptions::new();
        options.remote_callbacks(callbacks);
        if let Some(depth) = self.depth {
            options.depth(depth);
        }
        options
    }
}

impl MirrorTransport for GitTransport {
    fn clone_repo(&self, record: &RepoRecord) -> Result<(), MirrorError> {
        let path = &record.local_path;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }

        let mut builder = RepoBuilder::new();
        builder.branch(&record.default_branch);
        builder.fetch_options(self.fetch_options());
        builder
            .clone(&record.clone_url, path)
            .map_err(|e| git_err("clone", path, e))?;
        Ok(())
    }

    fn update(&self, record: &RepoRecord) -> Result<MirrorOutcome, MirrorError> {
        let path = &record.local_path;
        let repo = Repository::open(path).map_err(|e| git_err("open", path, e))?;

        let branch = record.default_branch.as_str();
        let tracking = format!("refs/remotes/{REMOTE}/{branch}");
        let refspec = format!("+refs/heads/{branch}:{tracking}");
        {
            let mut remote = repo
                .find_remote(REMOTE)
                .map_err(|e| git_err("find remote", path, e))?;
            let mut options = self.fetch_options();
            remote
                .fetch(&[refspec.as_str()], Some(&mut options), None)
                .map_err(|e| git_err("fetch", path, e))?;
        }

        let fetched = repo
            .find_reference(&tracking)
            .and_then(|reference| reference.peel_to_commit())
            .map_err(|e| git_err("resolve fetched head", path, e))?;

        let current = repo.head().ok().and_then(|head| head.target());
        if current == Some(fetched.id()) {
            return Ok(MirrorOutcome::UpToDate);
        }

        let local = format!("refs/heads/{branch}");
        repo.reference(&local, fetched.id(), true, "docmirror: move to remote head")
            .map_err(|e| git_err("update branch", path, e))?;
        repo.set_head(&local)
            .map_err(|e| git_err("set head", path, e))?;
        repo.checkout_head(Some(CheckoutBuilder::new().force()))
            .map_err(|e| git_err("checkout", path, e))?;

        if fetched.id().to_string() != record.commit_sha.0 {
            tracing::debug!(
                repo = %record.key(),
                observed = %record.commit_sha.short(),
                fetched = %fetched.id(),
                "remote head moved after observation",
            );
        }
        Ok(MirrorOutcome::Updated)
    }
}
