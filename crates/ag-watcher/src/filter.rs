//! File filtering for watch events.
//!
//! Events are filtered in the blocking watcher thread before they reach the
//! channel, so noisy paths (build output, generated files) never cost async
//! processing time.
//!
//! # Examples
//!
//! ```
//! use ag_watcher::{FileFilter, SourceFilter};
//! use camino::Utf8Path;
//!
//! let filter = SourceFilter::default();
//!
//! assert!(filter.should_process(Utf8Path::new("Domain/Order.cs")));
//! assert!(!filter.should_process(Utf8Path::new("Generated/Order.g.cs")));
//! assert!(!filter.should_process(Utf8Path::new("bin/Debug/Order.cs")));
//! ```

use camino::Utf8Path;
use smallvec::SmallVec;

use ag_core::SourceConfig;

/// A filter deciding which file events to process.
///
/// Called from the blocking watcher thread for every raw event, so
/// implementations must be [`Send`] + [`Sync`] + `'static` and cheap.
pub trait FileFilter: Send + Sync + 'static {
    /// Returns `true` if the file at the given path should be processed.
    fn should_process(&self, path: &Utf8Path) -> bool;
}

/// A filter that accepts all files.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllFilter;

impl FileFilter for AcceptAllFilter {
    #[inline]
    fn should_process(&self, _path: &Utf8Path) -> bool {
        true
    }
}

/// The filter used when watching a solution's source tree.
///
/// Accepts files whose extension is in the configured set, excluding
/// generated outputs (by suffix) and files inside skipped directories.
/// Excluding generated outputs is load-bearing: the consumer writes those
/// files itself, and processing them would feed the watcher its own output.
///
/// # Examples
///
/// ```
/// use ag_watcher::{FileFilter, SourceFilter};
/// use camino::Utf8Path;
///
/// let filter = SourceFilter::default();
/// assert!(filter.should_process(Utf8Path::new("Domain/Order.cs")));
/// assert!(!filter.should_process(Utf8Path::new("Domain/Order.g.cs")));
/// assert!(!filter.should_process(Utf8Path::new("obj/Order.cs")));
/// assert!(!filter.should_process(Utf8Path::new("README.md")));
/// ```
#[derive(Debug, Clone)]
pub struct SourceFilter {
    /// Accepted file extensions, without the leading dot.
    extensions: SmallVec<[String; 2]>,

    /// Directory names to skip anywhere in the path.
    skip_dirs: SmallVec<[String; 4]>,

    /// File-name suffix marking generated output.
    generated_suffix: String,
}

impl SourceFilter {
    /// Creates a filter from source configuration.
    #[must_use]
    pub fn from_config(config: &SourceConfig) -> Self {
        Self {
            extensions: config.extensions.iter().cloned().collect(),
            skip_dirs: config.skip_dirs.iter().cloned().collect(),
            generated_suffix: config.generated_suffix.clone(),
        }
    }

    fn has_source_extension(&self, path: &Utf8Path) -> bool {
        path.extension()
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
    }

    fn is_generated(&self, path: &Utf8Path) -> bool {
        path.as_str().ends_with(&self.generated_suffix)
    }

    fn in_skipped_dir(&self, path: &Utf8Path) -> bool {
        path.components()
            .any(|c| self.skip_dirs.iter().any(|d| d == c.as_str()))
    }
}

impl Default for SourceFilter {
    fn default() -> Self {
        Self::from_config(&SourceConfig::default())
    }
}

impl FileFilter for SourceFilter {
    fn should_process(&self, path: &Utf8Path) -> bool {
        self.has_source_extension(path) && !self.is_generated(path) && !self.in_skipped_dir(path)
    }
}

impl<F: FileFilter + ?Sized> FileFilter for Box<F> {
    fn should_process(&self, path: &Utf8Path) -> bool {
        (**self).should_process(path)
    }
}

impl<F: FileFilter + ?Sized> FileFilter for std::sync::Arc<F> {
    fn should_process(&self, path: &Utf8Path) -> bool {
        (**self).should_process(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_all_filter() {
        let filter = AcceptAllFilter;
        assert!(filter.should_process(Utf8Path::new("anything.txt")));
        assert!(filter.should_process(Utf8Path::new("")));
    }

    #[test]
    fn test_source_filter_accepts_source() {
        let filter = SourceFilter::default();
        assert!(filter.should_process(Utf8Path::new("Domain/Order.cs")));
        assert!(filter.should_process(Utf8Path::new("Order.cs")));
    }

    #[test]
    fn test_source_filter_rejects_other_extensions() {
        let filter = SourceFilter::default();
        assert!(!filter.should_process(Utf8Path::new("README.md")));
        assert!(!filter.should_process(Utf8Path::new("Shop.csproj")));
        assert!(!filter.should_process(Utf8Path::new("Makefile")));
    }

    #[test]
    fn test_source_filter_rejects_generated_output() {
        let filter = SourceFilter::default();
        assert!(!filter.should_process(Utf8Path::new("Generated/Order.g.cs")));
        assert!(!filter.should_process(Utf8Path::new("Order.g.cs")));
    }

    #[test]
    fn test_source_filter_rejects_skipped_dirs() {
        let filter = SourceFilter::default();
        assert!(!filter.should_process(Utf8Path::new("bin/Debug/net8.0/Order.cs")));
        assert!(!filter.should_process(Utf8Path::new("obj/Order.cs")));
        assert!(!filter.should_process(Utf8Path::new("Shop/.git/Order.cs")));
        // Skip matches whole components, not substrings
        assert!(filter.should_process(Utf8Path::new("binders/Order.cs")));
    }

    #[test]
    fn test_source_filter_custom_config() {
        let config = SourceConfig {
            extensions: vec!["fs".to_owned()],
            skip_dirs: vec!["out".to_owned()],
            generated_suffix: ".gen.fs".to_owned(),
        };
        let filter = SourceFilter::from_config(&config);

        assert!(filter.should_process(Utf8Path::new("Domain/Order.fs")));
        assert!(!filter.should_process(Utf8Path::new("Domain/Order.cs")));
        assert!(!filter.should_process(Utf8Path::new("Domain/Order.gen.fs")));
        assert!(!filter.should_process(Utf8Path::new("out/Order.fs")));
    }

    #[test]
    fn test_arc_filter() {
        let filter = std::sync::Arc::new(SourceFilter::default());
        assert!(filter.should_process(Utf8Path::new("Order.cs")));
        assert!(!filter.should_process(Utf8Path::new("Order.g.cs")));
    }
}
