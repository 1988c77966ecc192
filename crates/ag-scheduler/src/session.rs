//! Watch session: watcher wired to the scheduler.
//!
//! [`WatchSession`] owns the plumbing between a [`FileWatcher`] and a
//! [`RegenerationScheduler`]: it starts both, runs an initial full
//! regeneration so generated artifacts exist before the first file is
//! saved, and pumps watcher events into the scheduler until shutdown.

use tokio::task::JoinHandle;

use ag_core::Config;
use ag_watcher::{FileWatcher, SourceFilter, WatchError};

use std::sync::Arc;

use crate::activity::ActivityLog;
use crate::scheduler::RegenerationScheduler;
use crate::state::CachedModel;
use crate::traits::{Analyzer, GeneratorSet};

/// A running watch-and-regenerate session.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use ag_core::Config;
/// use ag_scheduler::{GeneratorSet, TracingLog, WatchSession};
/// # use ag_scheduler::Analyzer;
///
/// # async fn example(analyzer: Arc<dyn Analyzer>) -> Result<(), ag_watcher::WatchError> {
/// let config = Config {
///     project_path: "./Shop".into(),
///     ..Config::default()
/// };
/// let session = WatchSession::start(
///     config,
///     analyzer,
///     Arc::new(GeneratorSet::new()),
///     Arc::new(TracingLog),
/// )
/// .await?;
///
/// // ... later
/// session.shutdown().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct WatchSession {
    scheduler: RegenerationScheduler,
    pump: JoinHandle<Result<(), WatchError>>,
}

impl WatchSession {
    /// Starts watching the configured project path.
    ///
    /// The watcher filters events through a [`SourceFilter`] built from the
    /// source configuration, so generated files and build output never reach
    /// the scheduler. An initial full regeneration is queued immediately.
    ///
    /// # Errors
    ///
    /// Returns a [`WatchError`] if the project path does not exist or the
    /// watcher fails to initialize.
    pub async fn start(
        config: Config,
        analyzer: Arc<dyn Analyzer>,
        generators: Arc<GeneratorSet>,
        log: Arc<dyn ActivityLog>,
    ) -> Result<Self, WatchError> {
        let filter = SourceFilter::from_config(&config.source);
        let mut watcher =
            FileWatcher::new(&config.project_path, &config.watch, filter).await?;

        let scheduler = RegenerationScheduler::new(analyzer, generators, log, config);

        // Baseline pass: artifacts and the reverse index must exist before
        // the first incremental event arrives
        scheduler.force_full();

        let cancel = scheduler.cancellation_token();
        let pump_scheduler = scheduler.clone();
        let pump = tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    event = watcher.recv() => {
                        let Some(event) = event else { break };
                        tracing::debug!(path = %event.path, kind = %event.kind, "File event");
                        pump_scheduler.handle_event(&event);
                    }
                }
            }
            watcher.shutdown().await
        });

        Ok(Self { scheduler, pump })
    }

    /// The scheduler driving this session.
    #[must_use]
    pub fn scheduler(&self) -> &RegenerationScheduler {
        &self.scheduler
    }

    /// The current snapshot/index pair, once the initial pass has finished.
    #[must_use]
    pub fn current_model(&self) -> Option<Arc<CachedModel>> {
        self.scheduler.current_model()
    }

    /// Stops the session: cancels the scheduler, stops the watcher, and
    /// waits for the event pump to finish.
    ///
    /// # Errors
    ///
    /// Returns any error the watcher stopped with.
    pub async fn shutdown(self) -> Result<(), WatchError> {
        self.scheduler.cancel();
        match self.pump.await {
            Ok(result) => result,
            Err(_join_error) => Err(WatchError::ChannelClosed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::NullLog;
    use crate::error::AnalyzeError;
    use crate::traits::Analysis;
    use ag_core::{Aggregate, Project, Snapshot};
    use camino::{Utf8Path, Utf8PathBuf};
    use std::time::Duration;
    use tempfile::TempDir;

    struct FixedAnalyzer {
        solution_dir: Utf8PathBuf,
    }

    impl Analyzer for FixedAnalyzer {
        fn analyze(&self, _project_path: &Utf8Path) -> Result<Analysis, AnalyzeError> {
            Ok(Analysis {
                snapshot: Snapshot::from_projects([Project::new("Shop").with_aggregate(
                    Aggregate::new("Order").with_file("Order.cs").partial(),
                )]),
                solution_dir: self.solution_dir.clone(),
            })
        }
    }

    fn fast_config(project_path: Utf8PathBuf) -> Config {
        let mut config = Config {
            project_path,
            ..Config::default()
        };
        config.watch.debounce_ms = 10;
        config.watch.min_run_interval_ms = 10;
        config.watch.batch_pause_ms = 1;
        config
    }

    async fn start_session(dir: &TempDir) -> WatchSession {
        let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("UTF-8 temp dir");
        let analyzer = Arc::new(FixedAnalyzer {
            solution_dir: path.clone(),
        });
        WatchSession::start(
            fast_config(path),
            analyzer,
            Arc::new(GeneratorSet::new()),
            Arc::new(NullLog),
        )
        .await
        .expect("session should start")
    }

    #[tokio::test]
    async fn test_session_runs_initial_full_pass() {
        let dir = TempDir::new().expect("temp dir");
        let session = start_session(&dir).await;

        // Wait for the forced initial pass to install a model
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while session.current_model().is_none() {
            assert!(
                tokio::time::Instant::now() < deadline,
                "initial pass did not complete"
            );
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        let model = session.current_model().expect("model installed");
        assert!(model
            .snapshot
            .entity_keys()
            .contains(&ag_core::EntityKey::aggregate("Order")));

        session.shutdown().await.expect("clean shutdown");
    }

    #[tokio::test]
    async fn test_session_shutdown_is_clean() {
        let dir = TempDir::new().expect("temp dir");
        let session = start_session(&dir).await;
        session.shutdown().await.expect("clean shutdown");
    }

    #[tokio::test]
    async fn test_session_missing_path_errors() {
        let analyzer = Arc::new(FixedAnalyzer {
            solution_dir: Utf8PathBuf::from("/nonexistent"),
        });
        let result = WatchSession::start(
            fast_config(Utf8PathBuf::from("/nonexistent/path")),
            analyzer,
            Arc::new(GeneratorSet::new()),
            Arc::new(NullLog),
        )
        .await;

        assert!(matches!(result, Err(WatchError::PathNotFound(_))));
    }
}
