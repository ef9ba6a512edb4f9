//! Error types for tree walking.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;

use thiserror::Error;

/// Error returned by a visitor to abort the walk.
pub type VisitError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A failure tied to a single entry below the walk root.
///
/// These are handed to the visitor alongside the affected node. They only abort
/// the walk when errors are not being ignored.
#[derive(Debug, Error)]
pub enum EntryError {
    /// Failed to stat an entry.
    #[error("Failed to get metadata for {}: {io_error}", path.display())]
    Stat {
        /// The entry path.
        path: PathBuf,
        /// The underlying IO error.
        io_error: std::io::Error,
    },

    /// Failed to list the children of a directory.
    #[error("Failed to read directory {}: {io_error}", path.display())]
    ReadDir {
        /// The directory path.
        path: PathBuf,
        /// The underlying IO error.
        io_error: std::io::Error,
    },
}

impl EntryError {
    /// Path of the entry that failed.
    #[must_use]
    pub const fn path(&self) -> &PathBuf {
        match self {
            Self::Stat { path, .. } | Self::ReadDir { path, .. } => path,
        }
    }
}

/// Errors that terminate a walk.
#[derive(Debug, Error)]
pub enum WalkError {
    /// The root path could not be made absolute.
    #[error("Failed to resolve path {}: {io_error}", path.display())]
    Resolve {
        /// The path as given.
        path: PathBuf,
        /// The underlying IO error.
        io_error: std::io::Error,
    },

    /// The root path does not exist.
    #[error("Path not found: {}", path.display())]
    PathNotFound {
        /// The resolved root path.
        path: PathBuf,
    },

    /// The root path exists but could not be stat'ed.
    #[error("Failed to get metadata for {}: {io_error}", path.display())]
    PathStat {
        /// The resolved root path.
        path: PathBuf,
        /// The underlying IO error.
        io_error: std::io::Error,
    },

    /// An entry failed while errors were not being ignored.
    #[error(transparent)]
    Entry(#[from] EntryError),

    /// The visitor aborted the walk.
    #[error("Walk aborted at {}: {source}", path.display())]
    Visit {
        /// Path of the node being visited.
        path: PathBuf,
        /// The error returned by the visitor.
        source: VisitError,
    },
}
