//! Configuration structures for the aggregen tool.
//!
//! This module provides configuration types for all components:
//!
//! - [`WatchConfig`] - Debounce, throttle, and batching settings
//! - [`SourceConfig`] - Which files count as watched source
//! - [`GeneratorConfig`] - Output locations for generated artifacts
//! - [`Config`] - Root configuration combining all settings
//!
//! All configuration types implement [`Default`] with the values the
//! regeneration pipeline was tuned for.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Configuration for the regeneration scheduler and file watcher.
///
/// Controls how file change bursts are coalesced into regeneration passes.
///
/// # Examples
///
/// ```
/// use ag_core::WatchConfig;
///
/// let config = WatchConfig::default();
/// assert_eq!(config.debounce_ms, 500);
/// assert_eq!(config.max_incremental_files, 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Debounce window in milliseconds.
    ///
    /// File changes arriving within this window are coalesced into a
    /// single regeneration pass.
    pub debounce_ms: u64,

    /// Minimum milliseconds between the end of one regeneration pass and
    /// the start of the next.
    pub min_run_interval_ms: u64,

    /// Pause in milliseconds between drained batches.
    ///
    /// Lets a burst of events queue up without paying the full debounce
    /// window again.
    pub batch_pause_ms: u64,

    /// Largest changed-file set that may be handled incrementally.
    ///
    /// Anything bigger falls back to full regeneration.
    pub max_incremental_files: usize,

    /// Whether to watch subdirectories recursively.
    pub recursive: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            min_run_interval_ms: 500,
            batch_pause_ms: 100,
            max_incremental_files: 10,
            recursive: true,
        }
    }
}

/// Configuration for which files count as watched source.
///
/// Paths under build-output or tool-cache directories and files carrying the
/// reserved generated-file suffix never reach the scheduler.
///
/// # Examples
///
/// ```
/// use ag_core::SourceConfig;
///
/// let config = SourceConfig::default();
/// assert_eq!(config.generated_suffix, ".g.cs");
/// assert!(config.skip_dirs.iter().any(|d| d == "obj"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// File extensions treated as source (without the leading dot).
    pub extensions: Vec<String>,

    /// Directory names skipped entirely (build output, tool caches).
    pub skip_dirs: Vec<String>,

    /// Suffix reserved for generated files; changes to these are ignored
    /// so regeneration never re-triggers itself.
    pub generated_suffix: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["cs".to_owned()],
            skip_dirs: vec![
                "bin".to_owned(),
                "obj".to_owned(),
                ".git".to_owned(),
                ".vs".to_owned(),
            ],
            generated_suffix: ".g.cs".to_owned(),
        }
    }
}

/// Configuration for artifact generation.
///
/// # Examples
///
/// ```
/// use ag_core::GeneratorConfig;
///
/// let config = GeneratorConfig::default();
/// assert_eq!(config.output_dir, "Generated");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Directory (relative to the resolved solution dir) that generated
    /// artifacts are written into.
    pub output_dir: Utf8PathBuf,

    /// Location (relative to the resolved solution dir) the serialized
    /// model snapshot is persisted to after a full analysis.
    pub snapshot_path: Utf8PathBuf,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output_dir: Utf8PathBuf::from("Generated"),
            snapshot_path: Utf8PathBuf::from(".aggregen/model.json"),
        }
    }
}

/// Root configuration for the aggregen tool.
///
/// Combines all component configurations into a single structure that can be
/// loaded from a JSON file or constructed programmatically.
///
/// # Examples
///
/// ```
/// use ag_core::Config;
///
/// let config = Config::default();
/// let json = serde_json::to_string_pretty(&config).unwrap();
/// let parsed: Config = serde_json::from_str(&json).unwrap();
/// assert_eq!(config, parsed);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the watched project or solution root.
    pub project_path: Utf8PathBuf,

    /// Scheduler and watcher configuration.
    pub watch: WatchConfig,

    /// Source file filtering configuration.
    pub source: SourceConfig,

    /// Artifact generation configuration.
    pub generator: GeneratorConfig,
}

impl Config {
    /// Loads configuration from a JSON file.
    ///
    /// Missing fields fall back to their defaults, so a partial file is
    /// valid.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::Parse`] if it is not valid JSON.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }
}
