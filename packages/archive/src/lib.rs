//! Gzip-compressed tar archives of directory trees.
//!
//! [`compress`] walks a tree with `tree_mirror_paths` and streams every
//! directory, regular file and symlink into a `.tar.gz`; [`decompress`]
//! extracts one into a target directory. Entries that cannot be read or
//! written are skipped and listed in the returned [`ArchiveSummary`] unless
//! errors are not being ignored.
//!
//! # Example
//!
//! ```rust,ignore
//! use tree_mirror_archive::{compress, decompress};
//!
//! let packed = compress("/data/photos", "/backup", true)?;
//! let unpacked = decompress(&packed.archive, "/restore", true)?;
//! assert_eq!(packed.files, unpacked.files);
//! ```

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

mod compress;
mod decompress;
mod error;
mod summary;

pub use compress::{ARCHIVE_EXTENSION, archive_path, compress};
pub use decompress::decompress;
pub use error::{ArchiveError, SourceEntryError};
pub use summary::{ArchiveSummary, SkippedEntry};

use std::path::{Path, PathBuf};

use tree_mirror_paths::resolve_absolute;

fn resolve(path: &Path) -> Result<PathBuf, ArchiveError> {
    resolve_absolute(path).map_err(|e| ArchiveError::Resolve {
        path: path.to_path_buf(),
        io_error: e,
    })
}
