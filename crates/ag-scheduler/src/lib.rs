//! Regeneration scheduling for watched entity models.
//!
//! Turns file-change events into debounced, throttled regeneration passes
//! over an analyzed entity model. The crate owns the decision between
//! incremental (per-entity) and full regeneration, the reverse file index
//! that backs it, and the activity-log boundary progress is reported
//! through.
//!
//! The analyzer and the code generators are collaborators behind traits
//! ([`Analyzer`], [`Generator`]); this crate schedules them, it does not
//! parse or render anything itself.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use ag_core::Config;
//! use ag_scheduler::{Analyzer, GeneratorSet, TracingLog, WatchSession};
//!
//! async fn watch(analyzer: Arc<dyn Analyzer>) -> Result<(), ag_watcher::WatchError> {
//!     let config = Config {
//!         project_path: "./Shop".into(),
//!         ..Config::default()
//!     };
//!
//!     let session = WatchSession::start(
//!         config,
//!         analyzer,
//!         Arc::new(GeneratorSet::new()),
//!         Arc::new(TracingLog),
//!     )
//!     .await?;
//!
//!     tokio::signal::ctrl_c().await.ok();
//!     session.shutdown().await
//! }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod activity;
pub mod error;
pub mod index;
pub mod regen;
pub mod scheduler;
pub mod session;
mod state;
pub mod timing;
pub mod traits;

pub use activity::{ActivityEvent, ActivityLog, NullLog, RegenScope, TracingLog};
pub use error::{AnalyzeError, GenerateError, RegenError};
pub use index::FileEntityIndex;
pub use regen::EntityRegenerator;
pub use scheduler::RegenerationScheduler;
pub use session::WatchSession;
pub use state::CachedModel;
pub use traits::{Analysis, Analyzer, Generator, GeneratorKind, GeneratorSet};
