//! Source file watcher with async event streaming.
//!
//! Detects file changes under a watched root via the `notify` crate and
//! streams them into an async tokio context. Events are forwarded raw, one
//! per changed path, with their create / change / delete kind intact; the
//! consumer owns debouncing and batching, which need that information.
//!
//! Filtering happens at the source, in the blocking watcher thread: only
//! configured source extensions pass, generated outputs and build
//! directories are dropped before the channel.
//!
//! # Usage
//!
//! ```no_run
//! use ag_watcher::{FileWatcher, SourceFilter};
//! use ag_core::WatchConfig;
//! use camino::Utf8Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = WatchConfig::default();
//!     let filter = SourceFilter::default();
//!
//!     let mut watcher = FileWatcher::new(Utf8Path::new("./Shop"), &config, filter).await?;
//!
//!     while let Some(event) = watcher.recv().await {
//!         println!("{}: {}", event.kind, event.path);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
pub mod events;
pub mod filter;
pub mod watcher;

pub use error::WatchError;
pub use events::{FileEvent, FileEventKind};
pub use filter::{AcceptAllFilter, FileFilter, SourceFilter};
pub use watcher::FileWatcher;
