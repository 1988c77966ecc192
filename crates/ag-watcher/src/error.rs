//! Error types for the ag-watcher crate.

use camino::Utf8PathBuf;

/// Errors that can occur during file watching operations.
///
/// # Error Recovery Strategy
///
/// - **Notify errors** ([`WatchError::Notify`]): fatal, propagate immediately
/// - **Path not found** ([`WatchError::PathNotFound`]): fatal, the watched
///   root must exist
/// - **Channel closed** ([`WatchError::ChannelClosed`]): fatal, the consumer
///   is gone
/// - **Non-UTF-8 path** ([`WatchError::NonUtf8Path`]): recoverable, the
///   event is skipped and watching continues
/// - **I/O errors** ([`WatchError::Io`]): fatal, propagate immediately
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// Failed to initialize or operate the notify watcher.
    #[error("notify watcher error: {0}")]
    Notify(#[from] notify::Error),

    /// The watched root does not exist.
    #[error("path does not exist: {0}")]
    PathNotFound(Utf8PathBuf),

    /// The event channel was closed unexpectedly.
    #[error("event channel closed unexpectedly")]
    ChannelClosed,

    /// A path is not valid UTF-8.
    ///
    /// This crate uses UTF-8 paths throughout. If a non-UTF-8 path shows up
    /// in a file event, it is logged and skipped.
    #[error("path is not valid UTF-8: {}", _0.display())]
    NonUtf8Path(std::path::PathBuf),

    /// An I/O error occurred during path validation.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WatchError {
    /// Creates a new [`WatchError::PathNotFound`] error.
    #[inline]
    pub fn path_not_found(path: impl Into<Utf8PathBuf>) -> Self {
        Self::PathNotFound(path.into())
    }

    /// Creates a new [`WatchError::NonUtf8Path`] error.
    #[inline]
    pub fn non_utf8_path(path: impl Into<std::path::PathBuf>) -> Self {
        Self::NonUtf8Path(path.into())
    }

    /// Returns `true` if this error is recoverable (watching can continue).
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::NonUtf8Path(_))
    }

    /// Returns `true` if this error is fatal (watching should stop).
    #[inline]
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }

    /// Returns the path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::PathNotFound(path) => Some(path),
            Self::Notify(_) | Self::ChannelClosed | Self::NonUtf8Path(_) | Self::Io(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn test_watch_error_path_not_found() {
        let err = WatchError::path_not_found("src/missing");
        assert!(err.is_fatal());
        assert_eq!(err.path().map(|p| p.as_str()), Some("src/missing"));
        assert!(err.to_string().contains("src/missing"));
    }

    #[test]
    fn test_watch_error_channel_closed() {
        let err = WatchError::ChannelClosed;
        assert!(err.is_fatal());
        assert!(err.path().is_none());
        assert!(err.to_string().contains("channel closed"));
    }

    #[test]
    fn test_watch_error_non_utf8_is_recoverable() {
        let err = WatchError::non_utf8_path(PathBuf::from("test"));
        assert!(err.is_recoverable());
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_watch_error_io() {
        let err = WatchError::Io(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "access denied",
        ));
        assert!(err.is_fatal());
        assert!(err.to_string().contains("I/O error"));
    }
}
