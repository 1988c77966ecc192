//! Lock-guarded scheduler state.
//!
//! One mutex guards everything the scheduler mutates: the pending file set,
//! the debounce/drain flags, the throttle timestamp, and the cached model.
//! The flags are never exposed raw; callers go through the operations here,
//! so "record which file changed" and "decide whether to spawn a worker"
//! are atomic together.

use std::sync::Arc;

use camino::Utf8PathBuf;
use tokio::time::Instant;

use ag_core::{FxHashSet, Snapshot};

use crate::index::FileEntityIndex;

/// A snapshot paired with the index built from it.
///
/// The pair is installed and replaced as one unit, so no reader can ever
/// observe a snapshot next to a stale index.
#[derive(Debug)]
pub struct CachedModel {
    /// The entity model snapshot.
    pub snapshot: Arc<Snapshot>,

    /// The reverse file index built from `snapshot`.
    pub index: FileEntityIndex,

    /// The resolved solution directory the snapshot was analyzed from.
    pub solution_dir: Utf8PathBuf,
}

impl CachedModel {
    /// Builds the model record for a fresh snapshot, indexing it against
    /// the solution directory.
    #[must_use]
    pub fn new(snapshot: Snapshot, solution_dir: Utf8PathBuf) -> Self {
        let index = FileEntityIndex::build(&snapshot, &solution_dir);
        Self {
            snapshot: Arc::new(snapshot),
            index,
            solution_dir,
        }
    }
}

/// The mutable state behind the scheduler's mutex.
#[derive(Debug, Default)]
pub(crate) struct SchedulerState {
    /// Files noted since the last batch swap.
    pending_files: FxHashSet<Utf8PathBuf>,

    /// A debounce task has been spawned and has not finished.
    pending: bool,

    /// A drain loop is actively processing batches.
    running: bool,

    /// When the previous drain finished, for throttling.
    last_run_ended_at: Option<Instant>,

    /// The current model, if the last analysis succeeded.
    cache: Option<Arc<CachedModel>>,

    /// Last-known-good snapshot for change reporting.
    ///
    /// Survives cache invalidation: a failed analysis must not erase what
    /// the next successful one diffs against.
    baseline: Option<Arc<Snapshot>>,
}

impl SchedulerState {
    /// Notes a changed file and reports whether the caller must spawn the
    /// debounce task.
    ///
    /// Returns `false` while a debounce or drain is in flight (the change
    /// is coalesced into the pending set).
    pub(crate) fn note_change(&mut self, file: Option<Utf8PathBuf>) -> bool {
        if let Some(file) = file {
            self.pending_files.insert(file);
        }
        if self.pending || self.running {
            return false;
        }
        self.pending = true;
        true
    }

    /// Swaps out the pending file set and marks the drain loop running.
    pub(crate) fn take_batch(&mut self) -> FxHashSet<Utf8PathBuf> {
        self.running = true;
        std::mem::take(&mut self.pending_files)
    }

    /// Marks the drain finished and stamps the throttle timestamp.
    ///
    /// Unconditional; used on cancellation, where stranded pending files
    /// are acceptable. The normal exit path is [`try_finish`](Self::try_finish).
    pub(crate) fn finish(&mut self, now: Instant) {
        self.running = false;
        self.pending = false;
        self.last_run_ended_at = Some(now);
    }

    /// Finishes the drain only if no file arrived since the last swap.
    ///
    /// Checking the pending set and clearing the flags is one critical
    /// section: a change noted while `running` never spawns its own task,
    /// so clearing the flags with files still queued would strand them
    /// until an unrelated later event. Returns `false` when the caller
    /// must keep draining.
    pub(crate) fn try_finish(&mut self, now: Instant) -> bool {
        if !self.pending_files.is_empty() {
            return false;
        }
        self.finish(now);
        true
    }

    /// When the previous drain finished.
    pub(crate) fn last_run_ended_at(&self) -> Option<Instant> {
        self.last_run_ended_at
    }

    /// Installs a freshly built model and updates the diff baseline.
    pub(crate) fn install(&mut self, model: Arc<CachedModel>) {
        self.baseline = Some(Arc::clone(&model.snapshot));
        self.cache = Some(model);
    }

    /// Drops the cached model; the next pass is necessarily full.
    ///
    /// The diff baseline is kept.
    pub(crate) fn invalidate_cache(&mut self) {
        self.cache = None;
    }

    /// The current model, if any.
    pub(crate) fn cache(&self) -> Option<Arc<CachedModel>> {
        self.cache.clone()
    }

    /// The last-known-good snapshot for diffing.
    pub(crate) fn baseline(&self) -> Option<Arc<Snapshot>> {
        self.baseline.clone()
    }

    #[cfg(test)]
    pub(crate) fn is_idle(&self) -> bool {
        !self.pending && !self.running
    }
}
