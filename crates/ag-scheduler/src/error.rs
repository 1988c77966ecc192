//! Error types for the ag-scheduler crate.
//!
//! Collaborators fail with their own error kinds ([`AnalyzeError`],
//! [`GenerateError`]); the scheduler wraps everything it can hit during one
//! regeneration pass in [`RegenError`]. Errors never cross the activity-log
//! boundary as typed values, only as formatted messages.

use camino::Utf8PathBuf;

/// Errors an [`Analyzer`](crate::Analyzer) implementation can fail with.
///
/// # Error Recovery Strategy
///
/// Any analysis failure invalidates the cached model: the scheduler never
/// regenerates against a model paired with a failed analysis. The diff
/// baseline is kept, so the next successful analysis can still report
/// changes against the last-known-good snapshot.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    /// Failed to read a source file.
    #[error("failed to read source {path}: {source}")]
    Read {
        /// The path of the file that couldn't be read.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A source file could not be understood.
    #[error("malformed source in {path}: {message}")]
    Malformed {
        /// The path of the offending file.
        path: Utf8PathBuf,
        /// What was wrong with it.
        message: String,
    },

    /// No solution was found under the configured project path.
    #[error("no solution found under {0}")]
    SolutionNotFound(Utf8PathBuf),
}

impl AnalyzeError {
    /// Creates a new [`AnalyzeError::Read`] error.
    #[inline]
    pub fn read(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`AnalyzeError::Malformed`] error.
    #[inline]
    pub fn malformed(path: impl Into<Utf8PathBuf>, message: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns the file path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::Read { path, .. } | Self::Malformed { path, .. } => Some(path),
            Self::SolutionNotFound(path) => Some(path),
        }
    }
}

/// Errors a [`Generator`](crate::Generator) implementation can fail with.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// Failed to write a generated file.
    #[error("failed to write {path}: {source}")]
    Write {
        /// The path of the file that couldn't be written.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An entity could not be rendered.
    #[error("failed to render {entity}: {message}")]
    Render {
        /// The entity key the generator was working on.
        entity: String,
        /// What went wrong.
        message: String,
    },
}

impl GenerateError {
    /// Creates a new [`GenerateError::Write`] error.
    #[inline]
    pub fn write(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`GenerateError::Render`] error.
    #[inline]
    pub fn render(entity: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Render {
            entity: entity.into(),
            message: message.into(),
        }
    }
}

/// Errors that can occur during a regeneration pass.
///
/// These are caught at the drain-task boundary: the task reports the
/// failure, invalidates the cached model, and keeps running.
#[derive(Debug, thiserror::Error)]
pub enum RegenError {
    /// Analysis failed.
    #[error("analysis failed: {0}")]
    Analyze(#[from] AnalyzeError),

    /// Generation failed; the remainder of the batch was aborted.
    #[error("generation failed: {0}")]
    Generate(#[from] GenerateError),

    /// Failed to persist the serialized snapshot.
    #[error("failed to persist model snapshot to {path}: {source}")]
    Persist {
        /// The snapshot path that couldn't be written.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize the snapshot.
    #[error("failed to serialize model snapshot: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A background worker task failed to complete.
    #[error("background task failed: {0}")]
    Task(String),
}

impl RegenError {
    /// Creates a new [`RegenError::Persist`] error.
    #[inline]
    pub fn persist(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Persist {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`RegenError::Task`] error.
    #[inline]
    pub fn task(message: impl ToString) -> Self {
        Self::Task(message.to_string())
    }

    /// Returns `true` if this failure happened during analysis.
    #[inline]
    #[must_use]
    pub const fn is_analysis(&self) -> bool {
        matches!(self, Self::Analyze(_))
    }
}
