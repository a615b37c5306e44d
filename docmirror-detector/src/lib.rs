//! Change detection for `docmirror-detector`.
//!
//! [`ChangeDetector`] holds the retained record set, keyed by `(owner, name)`,
//! and classifies each fresh observation as new, changed or unchanged. It never
//! touches the network or the filesystem, so feeding it the same observation
//! twice has no effect beyond the first map update.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use docmirror_core::types::{CommitSha, RepoKey, RepoRecord};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Outcome of comparing an observation with the retained record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// First sighting of this key. The record was inserted.
    New,
    /// Head moved. The record was replaced; `previous` is the old head.
    Changed { previous: CommitSha },
    /// Same head as last time. Nothing was mutated.
    Unchanged,
}

/// Retained record set plus the comparison rule.
///
/// The record for a key reflects the most recent observation that differed
/// from its predecessor. Records are never removed.
#[derive(Debug, Default)]
pub struct ChangeDetector {
    records: HashMap<RepoKey, RepoRecord>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare `observed` with the retained record and update it if needed.
    pub fn detect(&mut self, observed: RepoRecord) -> Change {
        match self.records.entry(observed.key()) {
            Entry::Vacant(slot) => {
                slot.insert(observed);
                Change::New
            }
            Entry::Occupied(slot) if slot.get().commit_sha == observed.commit_sha => {
                Change::Unchanged
            }
            Entry::Occupied(mut slot) => {
                let previous = slot.insert(observed).commit_sha;
                Change::Changed { previous }
            }
        }
    }

    pub fn get(&self, key: &RepoKey) -> Option<&RepoRecord> {
        self.records.get(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn record(sha: &str) -> RepoRecord {
        RepoRecord::new(
            "ctxswitch",
            "gdoc",
            "https://github.com/ctxswitch/gdoc.git",
            "main",
            sha,
            Path::new("/srv/go"),
        )
    }

    #[test]
    fn changed_reports_previous_head() {
        let mut detector = ChangeDetector::new();
        detector.detect(record("c1"));
        assert_eq!(
            detector.detect(record("c2")),
            Change::Changed {
                previous: CommitSha::from("c1")
            }
        );
    }
}
