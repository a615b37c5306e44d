//! The poll loop: discovery, change detection and mirroring on a timer.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use docmirror_core::types::RepoRecord;
use docmirror_core::SyncOptions;
use docmirror_detector::{Change, ChangeDetector};
use docmirror_discovery::RepositorySource;
use docmirror_sync::{MirrorManager, MirrorOutcome, MirrorTransport};

use crate::error::DaemonError;

/// Receiving end of the shared shutdown broadcast.
///
/// A closed or lagged channel counts as shutdown, and once observed the
/// signal sticks.
#[derive(Debug)]
pub struct Shutdown {
    rx: broadcast::Receiver<()>,
    fired: bool,
}

impl Shutdown {
    pub fn new(rx: broadcast::Receiver<()>) -> Self {
        Self { rx, fired: false }
    }

    /// Non-blocking check.
    pub fn is_shutdown(&mut self) -> bool {
        if !self.fired {
            self.fired = !matches!(self.rx.try_recv(), Err(TryRecvError::Empty));
        }
        self.fired
    }

    /// Wait for the signal.
    pub async fn recv(&mut self) {
        if self.fired {
            return;
        }
        let _ = self.rx.recv().await;
        self.fired = true;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerState {
    Idle,
    Polling,
    Stopped,
}

/// Counts for one poll cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub listed: usize,
    pub new: usize,
    pub changed: usize,
    pub unchanged: usize,
    /// Head could not be resolved; nothing was recorded.
    pub skipped: usize,
    pub mirrored: usize,
    pub failed: usize,
    pub listing_failed: bool,
    pub cancelled: bool,
}

impl CycleReport {
    pub fn log(&self) {
        if self.listing_failed {
            tracing::warn!("poll cycle aborted: repository listing failed");
            return;
        }
        tracing::info!(
            listed = self.listed,
            new = self.new,
            changed = self.changed,
            unchanged = self.unchanged,
            skipped = self.skipped,
            mirrored = self.mirrored,
            failed = self.failed,
            cancelled = self.cancelled,
            "poll cycle complete",
        );
    }
}

pub struct Scheduler<S, T> {
    source: S,
    mirror: Arc<MirrorManager<T>>,
    detector: ChangeDetector,
    options: SyncOptions,
    state: SchedulerState,
}

impl<S, T> Scheduler<S, T>
where
    S: RepositorySource,
    T: MirrorTransport + 'static,
{
    pub fn new(source: S, mirror: MirrorManager<T>, options: SyncOptions) -> Self {
        Self {
            source,
            mirror: Arc::new(mirror),
            detector: ChangeDetector::new(),
            options,
            state: SchedulerState::Idle,
        }
    }

    /// `run` holds the scheduler for its whole lifetime, so this reads `Idle`
    /// before the loop starts and `Stopped` once it has returned. `Polling` is
    /// only ever set while `run` owns the borrow.
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn detector(&self) -> &ChangeDetector {
        &self.detector
    }

    /// Poll until `shutdown` fires.
    ///
    /// The first cycle starts one full interval after the call. Ticks are
    /// anchored to that start, so a cycle that overruns is followed
    /// immediately by the next one. Cycles never overlap.
    pub async fn run(&mut self, shutdown: broadcast::Receiver<()>) {
        let mut shutdown = Shutdown::new(shutdown);
        let interval = &self.options.poll_interval;
        if interval.is_aggressive() {
            tracing::warn!(
                interval = %interval,
                "poll interval is under one minute and may exhaust the API rate limit",
            );
        }
        tracing::info!(
            account = %self.options.account,
            topic = %self.options.topic,
            interval = %interval,
            root = %self.options.mirror_root.display(),
            "sync scheduler started",
        );

        let period = interval.as_duration();
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);

        loop {
            self.state = SchedulerState::Idle;
            if shutdown.is_shutdown() {
                break;
            }
            tokio::select! {
                biased;
                _ = shutdown.recv() => break,
                _ = ticker.tick() => {}
            }

            self.state = SchedulerState::Polling;
            let report = self.run_cycle(&mut shutdown).await;
            report.log();
            if report.cancelled {
                break;
            }
        }

        self.state = SchedulerState::Stopped;
        tracing::info!("sync scheduler stopped");
    }

    /// One discovery and mirror pass over every labelled repository.
    ///
    /// Shutdown abandons a pending listing or head lookup. A mirror already
    /// running is allowed to finish.
    ///
    /// The detector is updated before the mirror attempt, so a failed mirror
    /// still leaves the new head recorded.
    pub async fn run_cycle(&mut self, shutdown: &mut Shutdown) -> CycleReport {
        let mut report = CycleReport::default();

        let listed = tokio::select! {
            biased;
            _ = shutdown.recv() => {
                report.cancelled = true;
                return report;
            }
            listed = self.source.list_repositories() => listed,
        };
        let repos = match listed {
            Ok(repos) => repos,
            Err(err) => {
                tracing::error!(error = %err, "unable to list repositories");
                report.listing_failed = true;
                return report;
            }
        };
        report.listed = repos.len();

        for repo in repos {
            if shutdown.is_shutdown() {
                report.cancelled = true;
                break;
            }

            let key = repo.key();
            let resolved = tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    report.cancelled = true;
                    break;
                }
                resolved = self.source.resolve_head(&repo) => resolved,
            };
            let sha = match resolved {
                Ok(sha) => sha,
                Err(err) => {
                    tracing::warn!(repo = %key, error = %err, "skipping repository: head unresolved");
                    report.skipped += 1;
                    continue;
                }
            };

            let record = repo.into_record(sha, &self.options.mirror_root);
            match self.detector.detect(record.clone()) {
                Change::Unchanged => {
                    tracing::debug!(repo = %key, sha = %record.commit_sha.short(), "unchanged");
                    report.unchanged += 1;
                    continue;
                }
                Change::New => {
                    tracing::info!(repo = %key, sha = %record.commit_sha.short(), "new repository");
                    report.new += 1;
                }
                Change::Changed { previous } => {
                    tracing::info!(
                        repo = %key,
                        previous = %previous.short(),
                        sha = %record.commit_sha.short(),
                        "repository changed",
                    );
                    report.changed += 1;
                }
            }

            match self.sync_mirror(record).await {
                Ok(outcome) => {
                    tracing::info!(repo = %key, %outcome, "mirror synchronized");
                    report.mirrored += 1;
                }
                Err(err) => {
                    tracing::error!(repo = %key, error = %err, "mirror failed");
                    report.failed += 1;
                }
            }
        }

        report
    }

    async fn sync_mirror(&self, record: RepoRecord) -> Result<MirrorOutcome, DaemonError> {
        let mirror = Arc::clone(&self.mirror);
        let outcome = tokio::task::spawn_blocking(move || mirror.sync(&record))
            .await
            .map_err(|err| DaemonError::Task(format!("mirror ({err})")))??;
        Ok(outcome)
    }
}
