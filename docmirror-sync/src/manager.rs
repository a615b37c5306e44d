//! Clone-or-update dispatch for a single repository record.

use std::fmt;

use docmirror_core::types::RepoRecord;

use crate::error::MirrorError;

/// What a mirror operation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorOutcome {
    /// `local_path` did not exist; a fresh working copy was created.
    Cloned,
    /// The existing working copy moved to a newer head.
    Updated,
    /// The existing working copy already matched the remote head.
    UpToDate,
}

impl fmt::Display for MirrorOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MirrorOutcome::Cloned => write!(f, "cloned"),
            MirrorOutcome::Updated => write!(f, "updated"),
            MirrorOutcome::UpToDate => write!(f, "up-to-date"),
        }
    }
}

/// The two filesystem-mutating operations a mirror needs.
///
/// Implementations are blocking; async callers run them on the blocking pool.
pub trait MirrorTransport: Send + Sync {
    /// Create a working copy of `record.clone_url` at `record.local_path`.
    fn clone_repo(&self, record: &RepoRecord) -> Result<(), MirrorError>;

    /// Bring the existing working copy at `record.local_path` to the remote
    /// head of `record.default_branch`.
    fn update(&self, record: &RepoRecord) -> Result<MirrorOutcome, MirrorError>;
}

/// Chooses between clone and update for a record.
///
/// The only signal is whether `local_path` exists. An existing directory that
/// is not a usable working copy makes the update fail; it is not replaced.
#[derive(Debug)]
pub struct MirrorManager<T> {
    transport: T,
}

impl<T: MirrorTransport> MirrorManager<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Ensure `record.local_path` holds a working copy at the remote head.
    pub fn sync(&self, record: &RepoRecord) -> Result<MirrorOutcome, MirrorError> {
        if !record.local_path.exists() {
            tracing::info!(
                repo = %record.key(),
                path = %record.local_path.display(),
                "cloning repository",
            );
            self.transport.clone_repo(record)?;
            return Ok(MirrorOutcome::Cloned);
        }

        tracing::info!(
            repo = %record.key(),
            path = %record.local_path.display(),
            "pulling repository",
        );
        self.transport.update(record)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct RecordingTransport {
        calls: Mutex<Vec<&'static str>>,
        fail: bool,
    }

    impl RecordingTransport {
        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }

        fn result(&self, path: &Path) -> Result<(), MirrorError> {
            if self.fail {
                return Err(MirrorError::Git {
                    op: "fetch",
                    path: path.to_path_buf(),
                    source: git2::Error::from_str("remote hung up"),
                });
            }
            Ok(())
        }
    }

    impl MirrorTransport for RecordingTransport {
        fn clone_repo(&self, record: &RepoRecord) -> Result<(), MirrorError> {
            self.calls.lock().unwrap().push("clone");
            self.result(&record.local_path)
        }

        fn update(&self, record: &RepoRecord) -> Result<MirrorOutcome, MirrorError> {
            self.calls.lock().unwrap().push("update");
            self.result(&record.local_path)?;
            Ok(MirrorOutcome::Updated)
        }
    }

    fn record(root: &Path) -> RepoRecord {
        RepoRecord::new(
            "ctxswitch",
            "gdoc",
            "https://github.com/ctxswitch/gdoc.git",
            "main",
            "abc1234",
            root,
        )
    }

    #[test]
    fn missing_path_clones() {
        let root = tempfile::tempdir().unwrap();
        let manager = MirrorManager::new(RecordingTransport::default());
        let outcome = manager.sync(&record(root.path())).unwrap();
        assert_eq!(outcome, MirrorOutcome::Cloned);
        assert_eq!(manager.transport().calls(), vec!["clone"]);
    }

    #[test]
    fn existing_path_updates() {
        let root = tempfile::tempdir().unwrap();
        let rec = record(root.path());
        std::fs::create_dir_all(&rec.local_path).unwrap();

        let manager = MirrorManager::new(RecordingTransport::default());
        let outcome = manager.sync(&rec).unwrap();
        assert_eq!(outcome, MirrorOutcome::Updated);
        assert_eq!(manager.transport().calls(), vec!["update"]);
    }

    #[test]
    fn transport_failure_propagates() {
        let root = tempfile::tempdir().unwrap();
        let manager = MirrorManager::new(RecordingTransport {
            fail: true,
            ..Default::default()
        });
        let err = manager.sync(&record(root.path())).unwrap_err();
        assert!(matches!(err, MirrorError::Git { op: "fetch", .. }), "{err:?}");
        assert!(err.to_string().contains("remote hung up"), "{err}");
    }

    #[test]
    fn outcome_display() {
        assert_eq!(MirrorOutcome::Cloned.to_string(), "cloned");
        assert_eq!(MirrorOutcome::UpToDate.to_string(), "up-to-date");
    }
}
