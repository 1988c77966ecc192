//! Event types for file change notifications.
//!
//! Raw notify events are mapped to [`FileEvent`] values carrying the path
//! and a coarse [`FileEventKind`]. No debouncing happens here; the consumer
//! owns the debounce window and needs undecayed create/delete information to
//! classify changes.

use std::time::Instant;

use camino::Utf8PathBuf;

/// The coarse kind of a file change.
///
/// Editors produce noisy event sequences (temp files, renames, metadata
/// touches); this enum keeps only the distinction the consumer cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileEventKind {
    /// The file content was modified.
    Changed,
    /// The file was created (or renamed into place).
    Created,
    /// The file was deleted (or renamed away).
    Deleted,
}

impl FileEventKind {
    /// Maps a notify event kind, returning `None` for events that carry no
    /// content change (access notifications).
    #[must_use]
    pub fn from_notify(kind: &notify::EventKind) -> Option<Self> {
        use notify::EventKind;
        match kind {
            EventKind::Create(_) => Some(Self::Created),
            EventKind::Remove(_) => Some(Self::Deleted),
            EventKind::Modify(_) | EventKind::Any | EventKind::Other => Some(Self::Changed),
            EventKind::Access(_) => None,
        }
    }

    /// Canonical lowercase label.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Changed => "changed",
            Self::Created => "created",
            Self::Deleted => "deleted",
        }
    }
}

impl std::fmt::Display for FileEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single file change with a UTF-8 path guarantee.
///
/// # Examples
///
/// ```
/// use ag_watcher::{FileEvent, FileEventKind};
/// use camino::Utf8PathBuf;
///
/// let event = FileEvent::new(Utf8PathBuf::from("Domain/Order.cs"), FileEventKind::Changed);
/// assert_eq!(event.path.as_str(), "Domain/Order.cs");
/// assert_eq!(event.extension(), Some("cs"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    /// Absolute path of the file that changed.
    pub path: Utf8PathBuf,

    /// What happened to the file.
    pub kind: FileEventKind,

    /// Monotonic timestamp of when the event was received.
    pub timestamp: Instant,
}

impl FileEvent {
    /// Creates a new file event stamped with the current instant.
    #[inline]
    #[must_use]
    pub fn new(path: Utf8PathBuf, kind: FileEventKind) -> Self {
        Self {
            path,
            kind,
            timestamp: Instant::now(),
        }
    }

    /// Creates a file event with an explicit timestamp.
    #[inline]
    #[must_use]
    pub const fn with_timestamp(path: Utf8PathBuf, kind: FileEventKind, timestamp: Instant) -> Self {
        Self {
            path,
            kind,
            timestamp,
        }
    }

    /// Returns the file extension, if any.
    #[inline]
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        self.path.extension()
    }

    /// Returns the file name without the directory path.
    #[inline]
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changed(path: &str) -> FileEvent {
        FileEvent::new(Utf8PathBuf::from(path), FileEventKind::Changed)
    }

    #[test]
    fn test_kind_from_notify() {
        use notify::event::{CreateKind, ModifyKind, RemoveKind};
        use notify::EventKind;

        assert_eq!(
            FileEventKind::from_notify(&EventKind::Create(CreateKind::File)),
            Some(FileEventKind::Created)
        );
        assert_eq!(
            FileEventKind::from_notify(&EventKind::Remove(RemoveKind::File)),
            Some(FileEventKind::Deleted)
        );
        assert_eq!(
            FileEventKind::from_notify(&EventKind::Modify(ModifyKind::Any)),
            Some(FileEventKind::Changed)
        );
        assert_eq!(
            FileEventKind::from_notify(&EventKind::Access(notify::event::AccessKind::Any)),
            None
        );
    }

    #[test]
    fn test_file_event_accessors() {
        let event = changed("Domain/Orders/Order.cs");
        assert_eq!(event.extension(), Some("cs"));
        assert_eq!(event.file_name(), Some("Order.cs"));
    }

    #[test]
    fn test_event_with_timestamp() {
        let stamp = Instant::now();
        let event =
            FileEvent::with_timestamp(Utf8PathBuf::from("a.cs"), FileEventKind::Deleted, stamp);
        assert_eq!(event.timestamp, stamp);
        assert_eq!(event.kind, FileEventKind::Deleted);
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(FileEventKind::Changed.to_string(), "changed");
        assert_eq!(FileEventKind::Created.to_string(), "created");
        assert_eq!(FileEventKind::Deleted.to_string(), "deleted");
    }
}
