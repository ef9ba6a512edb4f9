//! Error types for replication.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;

use tree_mirror_paths::WalkError;

/// Errors that abort a replication job.
///
/// Failures of individual entries are not reported here; they are recorded as
/// [`FailureRecord`](crate::FailureRecord)s in the job report.
#[derive(Debug, thiserror::Error)]
pub enum CopyError {
    /// No source path was given.
    #[error("Source path is empty")]
    EmptySourcePath,

    /// No target path was given.
    #[error("Target path is empty")]
    EmptyTargetPath,

    /// A path could not be made absolute.
    #[error("Failed to resolve path {}: {io_error}", path.display())]
    ResolvePath {
        /// The path as given.
        path: PathBuf,
        /// The underlying IO error.
        io_error: std::io::Error,
    },

    /// The source path does not exist.
    #[error("Source path not found: {}", path.display())]
    SourceNotFound {
        /// The resolved source path.
        path: PathBuf,
    },

    /// The target would be discovered while walking the source.
    #[error("Target {} is inside source {}", target_path.display(), source_path.display())]
    TargetInsideSource {
        /// The resolved source path.
        source_path: PathBuf,
        /// The resolved target path.
        target_path: PathBuf,
    },

    /// The copy thread pool could not be started.
    #[error("Failed to start copy workers: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Traversal ended with a fatal error.
    #[error(transparent)]
    Walk(#[from] WalkError),

    /// The dispatch loop panicked.
    #[error("Copy dispatcher terminated unexpectedly")]
    DispatcherPanicked,

    /// The job was cancelled before it completed.
    #[error("Replication cancelled")]
    Cancelled,
}

/// Failure of a single directory or file.
///
/// The display text becomes the `reason` of the recorded failure.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// Failed to create a target directory.
    #[error("Failed to create directory {}: {io_error}", path.display())]
    CreateDir {
        /// The directory path.
        path: PathBuf,
        /// The underlying IO error.
        io_error: std::io::Error,
    },

    /// Failed to open the source file.
    #[error("Failed to open source file {}: {io_error}", path.display())]
    OpenSource {
        /// The source file path.
        path: PathBuf,
        /// The underlying IO error.
        io_error: std::io::Error,
    },

    /// The source is not a regular file, or a link to one.
    #[error("Skipped {}: unsupported file type", path.display())]
    UnsupportedFileType {
        /// The source path.
        path: PathBuf,
    },

    /// Failed to create the target file.
    #[error("Failed to open target file {}: {io_error}", path.display())]
    CreateTarget {
        /// The target file path.
        path: PathBuf,
        /// The underlying IO error.
        io_error: std::io::Error,
    },

    /// Failed while reading the source file.
    #[error("Failed to read {}: {io_error}", path.display())]
    Read {
        /// The source file path.
        path: PathBuf,
        /// The underlying IO error.
        io_error: std::io::Error,
    },

    /// Failed while writing the target file.
    #[error("Failed to write {}: {io_error}", path.display())]
    Write {
        /// The target file path.
        path: PathBuf,
        /// The underlying IO error.
        io_error: std::io::Error,
    },

    /// The task queue was closed before the task could be enqueued.
    #[error("Copy queue closed before {} was enqueued", path.display())]
    QueueClosed {
        /// The source file path.
        path: PathBuf,
    },

    /// The job was cancelled before or during the copy.
    #[error("Cancelled before {} was copied", path.display())]
    Cancelled {
        /// The source file path.
        path: PathBuf,
    },

    /// Processing the entry panicked.
    #[error("Panicked while processing {}: {message}", path.display())]
    Panicked {
        /// The entry path.
        path: PathBuf,
        /// The panic payload, when it was a string.
        message: String,
    },
}

impl TaskError {
    /// Build a [`TaskError::Panicked`] from a caught panic payload.
    pub(crate) fn from_panic(path: PathBuf, payload: &(dyn std::any::Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(ToString::to_string)
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Self::Panicked { path, message }
    }
}
