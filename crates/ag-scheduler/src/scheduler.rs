//! Debounced regeneration scheduling.
//!
//! [`RegenerationScheduler`] turns file-change notifications into
//! regeneration passes. Changes coalesce into a pending set; at most one
//! debounce-and-drain task is in flight; batches are processed strictly
//! sequentially, so no two analyzer calls ever overlap.
//!
//! ```text
//! handle_event ──> note change ──┬── already pending/running: coalesce
//!                                └── spawn debounce task
//!                                      sleep(debounce ∪ throttle)
//!                                      loop: swap pending set
//!                                            decide full / incremental
//!                                            analyze, diff, install, generate
//!                                            pause 100ms, re-check
//! ```

use std::sync::Arc;
use std::time::Duration;

use camino::Utf8PathBuf;
use parking_lot::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use ag_core::{Config, EntityKey, Snapshot};
use ag_watcher::{FileEvent, FileEventKind};

use crate::activity::{ActivityEvent, ActivityLog, RegenScope};
use crate::error::RegenError;
use crate::regen::EntityRegenerator;
use crate::state::{CachedModel, SchedulerState};
use crate::timing::debounce_wait;
use crate::traits::{Analysis, Analyzer, GeneratorSet};

/// What one batch requires.
#[derive(Debug)]
enum Decision {
    Full,
    Incremental(Vec<EntityKey>),
}

/// Schedules and runs regeneration passes.
///
/// Cloned handles share one state; the scheduler is cheap to clone and
/// callable from any task. Watcher callbacks must only call the
/// non-blocking [`handle_event`](Self::handle_event) /
/// [`enqueue`](Self::enqueue) — analysis and generation always happen on
/// the background drain task.
#[derive(Clone)]
pub struct RegenerationScheduler {
    inner: Arc<Inner>,
}

struct Inner {
    analyzer: Arc<dyn Analyzer>,
    regenerator: EntityRegenerator,
    log: Arc<dyn ActivityLog>,
    config: Config,
    state: Mutex<SchedulerState>,
    cancel: CancellationToken,
}

impl std::fmt::Debug for RegenerationScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegenerationScheduler")
            .field("project_path", &self.inner.config.project_path)
            .field("cancelled", &self.inner.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl RegenerationScheduler {
    /// Creates a scheduler over the given collaborators.
    #[must_use]
    pub fn new(
        analyzer: Arc<dyn Analyzer>,
        generators: Arc<GeneratorSet>,
        log: Arc<dyn ActivityLog>,
        config: Config,
    ) -> Self {
        let regenerator = EntityRegenerator::new(generators, config.generator.clone());
        Self {
            inner: Arc::new(Inner {
                analyzer,
                regenerator,
                log,
                config,
                state: Mutex::new(SchedulerState::default()),
                cancel: CancellationToken::new(),
            }),
        }
    }

    /// Routes one watcher event.
    ///
    /// Content changes go through the debounce/incremental path; created
    /// and deleted files always force a full regeneration (the index
    /// cannot know what a new file declares or a deleted one declared).
    pub fn handle_event(&self, event: &FileEvent) {
        match event.kind {
            FileEventKind::Changed => self.enqueue(Some(event.path.clone())),
            FileEventKind::Created | FileEventKind::Deleted => self.force_full(),
        }
    }

    /// Notes a changed file and ensures a debounce task is in flight.
    ///
    /// Non-blocking and coalescing: while a debounce or drain is already
    /// pending, the file only joins the pending set.
    pub fn enqueue(&self, file: Option<Utf8PathBuf>) {
        let spawn = self.inner.state.lock().note_change(file);
        if spawn {
            let inner = Arc::clone(&self.inner);
            tokio::spawn(async move {
                inner.debounce_and_drain().await;
            });
        }
    }

    /// Forces the next pass to regenerate everything.
    ///
    /// Only invalidates the cached model and enqueues; never starts a
    /// second concurrent analysis.
    pub fn force_full(&self) {
        self.inner.state.lock().invalidate_cache();
        self.enqueue(None);
    }

    /// The current snapshot/index pair, if the last analysis succeeded.
    ///
    /// The pair is swapped as one unit; a reader never sees a snapshot
    /// next to a stale index.
    #[must_use]
    pub fn current_model(&self) -> Option<Arc<CachedModel>> {
        self.inner.state.lock().cache()
    }

    /// The cancellation token stopping this scheduler.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.inner.cancel.clone()
    }

    /// Cancels the scheduler: interrupts a pending debounce sleep and
    /// stops the drain loop between batches, never mid-generation.
    /// Idempotent.
    pub fn cancel(&self) {
        self.inner.cancel.cancel();
    }
}

impl Inner {
    /// The debounce-and-drain task. At most one runs at a time.
    ///
    /// Every error is caught here; the task itself never dies, and the
    /// scheduler stays usable after a failed pass.
    async fn debounce_and_drain(self: Arc<Self>) {
        let wait = {
            let state = self.state.lock();
            debounce_wait(
                Duration::from_millis(self.config.watch.debounce_ms),
                Duration::from_millis(self.config.watch.min_run_interval_ms),
                Instant::now(),
                state.last_run_ended_at(),
            )
        };

        tokio::select! {
            () = self.cancel.cancelled() => {
                self.state.lock().finish(Instant::now());
                return;
            }
            () = tokio::time::sleep(wait) => {}
        }

        // First pass always runs: an empty set here means a forced full
        // regeneration was requested with no specific file.
        let mut first = true;
        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            let batch = self.state.lock().take_batch();
            if batch.is_empty() && !first {
                // A file noted while `running` never spawns its own task,
                // so the empty check and the flag clear must be atomic;
                // otherwise a save landing between them is stranded.
                if self.state.lock().try_finish(Instant::now()) {
                    return;
                }
                continue;
            }
            first = false;

            let started = Instant::now();
            match self.run_pass(batch.into_iter().collect()).await {
                Ok((scope, regenerated)) => {
                    self.log.record(ActivityEvent::RegenCompleted {
                        scope,
                        elapsed: started.elapsed(),
                        regenerated,
                    });
                }
                Err(error) => {
                    tracing::warn!(error = %error, "Regeneration pass failed");
                    self.state.lock().invalidate_cache();
                    self.log.record(ActivityEvent::RegenFailed {
                        message: error.to_string(),
                        elapsed: started.elapsed(),
                    });
                }
            }

            // Drain bursts without re-debouncing, but let stragglers land
            tokio::select! {
                () = self.cancel.cancelled() => break,
                () = tokio::time::sleep(Duration::from_millis(self.config.watch.batch_pause_ms)) => {}
            }
        }

        // Cancelled: clear flags unconditionally, stranded files are moot
        self.state.lock().finish(Instant::now());
    }

    /// Runs one batch end to end and reports its scope and entity count.
    async fn run_pass(&self, files: Vec<Utf8PathBuf>) -> Result<(RegenScope, usize), RegenError> {
        match self.decide(&files) {
            Decision::Full => self.run_full().await,
            Decision::Incremental(keys) => self.run_incremental(keys).await,
        }
    }

    /// Applies the incremental-vs-full decision to a changed-file set.
    fn decide(&self, files: &[Utf8PathBuf]) -> Decision {
        let Some(cache) = self.state.lock().cache() else {
            return Decision::Full;
        };
        if files.is_empty() || files.len() > self.config.watch.max_incremental_files {
            return Decision::Full;
        }

        let mut keys: std::collections::BTreeSet<EntityKey> = std::collections::BTreeSet::new();
        for file in files {
            let resolved = cache.index.resolve(file);
            if resolved.is_empty() {
                // Untracked file: it may declare anything, regenerate all
                tracing::debug!(path = %file, "Changed file not in index, going full");
                return Decision::Full;
            }
            keys.extend(resolved);
        }
        Decision::Incremental(keys.into_iter().collect())
    }

    /// Full pass: analyze, diff against the baseline, install, persist,
    /// run every generator kind for every project.
    async fn run_full(&self) -> Result<(RegenScope, usize), RegenError> {
        self.log.record(ActivityEvent::RegenStarted {
            scope: RegenScope::Full,
        });

        let analysis = self.analyze().await?;
        let model = self.diff_and_install(analysis);

        self.persist_snapshot(&model).await?;

        let regenerator = self.regenerator.clone();
        let worker_model = Arc::clone(&model);
        let regenerated =
            tokio::task::spawn_blocking(move || regenerator.full_pass(&worker_model))
                .await
                .map_err(RegenError::task)??;

        Ok((RegenScope::Full, regenerated))
    }

    /// Incremental pass: analyze (the model must be current even for one
    /// entity), diff, install, regenerate only the affected entities.
    async fn run_incremental(
        &self,
        keys: Vec<EntityKey>,
    ) -> Result<(RegenScope, usize), RegenError> {
        let scope = RegenScope::Incremental {
            entities: keys.clone(),
        };
        self.log.record(ActivityEvent::RegenStarted {
            scope: scope.clone(),
        });

        let analysis = self.analyze().await?;
        let model = self.diff_and_install(analysis);

        let regenerator = self.regenerator.clone();
        let worker_model = Arc::clone(&model);
        let log = Arc::clone(&self.log);
        let regenerated = tokio::task::spawn_blocking(move || {
            regenerator.regenerate_batch(&worker_model, &keys, log.as_ref())
        })
        .await
        .map_err(RegenError::task)??;

        Ok((scope, regenerated))
    }

    /// Runs the analyzer off the async runtime.
    async fn analyze(&self) -> Result<Analysis, RegenError> {
        let analyzer = Arc::clone(&self.analyzer);
        let path = self.config.project_path.clone();
        tokio::task::spawn_blocking(move || analyzer.analyze(&path))
            .await
            .map_err(RegenError::task)?
            .map_err(RegenError::from)
    }

    /// Diffs the fresh snapshot against the baseline for reporting, then
    /// atomically installs the new snapshot/index pair.
    fn diff_and_install(&self, analysis: Analysis) -> Arc<CachedModel> {
        let previous = self.state.lock().baseline();
        let changes = ag_diff::detect(previous.as_deref(), &analysis.snapshot);
        self.log.record(ActivityEvent::ChangesDetected { changes });

        let model = Arc::new(CachedModel::new(analysis.snapshot, analysis.solution_dir));
        self.state.lock().install(Arc::clone(&model));
        model
    }

    /// Persists the serialized snapshot. Ordering constraint: after
    /// analysis, before generation, so a crash mid-generation leaves a
    /// snapshot consistent with what analysis saw.
    async fn persist_snapshot(&self, model: &Arc<CachedModel>) -> Result<(), RegenError> {
        let path = model
            .solution_dir
            .join(&self.config.generator.snapshot_path);
        let snapshot: Arc<Snapshot> = Arc::clone(&model.snapshot);

        tokio::task::spawn_blocking(move || -> Result<(), RegenError> {
            let json = serde_json::to_string_pretty(snapshot.as_ref())?;
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| RegenError::persist(parent, e))?;
            }
            std::fs::write(&path, json).map_err(|e| RegenError::persist(&path, e))?;
            tracing::debug!(path = %path, "Snapshot persisted");
            Ok(())
        })
        .await
        .map_err(RegenError::task)?
    }
}
