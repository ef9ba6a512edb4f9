//! Error types for archiving.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;

use thiserror::Error;
use tree_mirror_paths::WalkError;

/// Errors that abort a compress or decompress run.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// A path could not be made absolute.
    #[error("Failed to resolve path {}: {io_error}", path.display())]
    Resolve {
        /// The path as given.
        path: PathBuf,
        /// The underlying IO error.
        io_error: std::io::Error,
    },

    /// The source tree or archive does not exist.
    #[error("Source not found: {}", path.display())]
    SourceNotFound {
        /// The resolved source path.
        path: PathBuf,
    },

    /// Decompression was pointed at a directory instead of an archive.
    #[error("Archive path is a directory: {}", path.display())]
    SourceIsDirectory {
        /// The resolved archive path.
        path: PathBuf,
    },

    /// Failed to create the archive file.
    #[error("Failed to create archive {}: {io_error}", path.display())]
    CreateArchive {
        /// The archive path.
        path: PathBuf,
        /// The underlying IO error.
        io_error: std::io::Error,
    },

    /// Failed to append an entry to the archive.
    #[error("Failed to write {} into the archive: {io_error}", path.display())]
    Append {
        /// The source entry path.
        path: PathBuf,
        /// The underlying IO error.
        io_error: std::io::Error,
    },

    /// Failed to flush the compressed stream.
    #[error("Failed to finish archive {}: {io_error}", path.display())]
    Finish {
        /// The archive path.
        path: PathBuf,
        /// The underlying IO error.
        io_error: std::io::Error,
    },

    /// Failed to open the archive for reading.
    #[error("Failed to open archive {}: {io_error}", path.display())]
    OpenArchive {
        /// The archive path.
        path: PathBuf,
        /// The underlying IO error.
        io_error: std::io::Error,
    },

    /// The archive stream is not a readable gzip-compressed tar.
    #[error("Failed to read archive {}: {io_error}", path.display())]
    ReadArchive {
        /// The archive path.
        path: PathBuf,
        /// The underlying IO error.
        io_error: std::io::Error,
    },

    /// Failed to create the extraction directory.
    #[error("Failed to create directory {}: {io_error}", path.display())]
    CreateDir {
        /// The directory path.
        path: PathBuf,
        /// The underlying IO error.
        io_error: std::io::Error,
    },

    /// Failed to extract an entry while errors were not being ignored.
    #[error("Failed to extract {}: {io_error}", path.display())]
    Extract {
        /// The entry path inside the archive.
        path: PathBuf,
        /// The underlying IO error.
        io_error: std::io::Error,
    },

    /// Traversal of the source tree failed.
    #[error(transparent)]
    Walk(#[from] WalkError),
}

/// A source entry that could not be packed. Skipped when errors are ignored.
#[derive(Debug, Error)]
pub enum SourceEntryError {
    /// Failed to open a source file.
    #[error("Failed to open source file {}: {io_error}", path.display())]
    Open {
        /// The source file path.
        path: PathBuf,
        /// The underlying IO error.
        io_error: std::io::Error,
    },

    /// Failed to read where a symlink points.
    #[error("Failed to read link {}: {io_error}", path.display())]
    ReadLink {
        /// The symlink path.
        path: PathBuf,
        /// The underlying IO error.
        io_error: std::io::Error,
    },

    /// FIFOs, sockets and devices are not archived.
    #[error("Skipped {}: unsupported file type", path.display())]
    UnsupportedFileType {
        /// The entry path.
        path: PathBuf,
    },
}
