//! Totals of an archive run.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;

use serde::Serialize;

/// An entry left out of the archive or the extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedEntry {
    /// Source path when compressing, path inside the archive when extracting.
    pub path: PathBuf,
    /// Why it was skipped.
    pub reason: String,
}

/// Outcome of a compress or decompress run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveSummary {
    /// The archive written or read.
    pub archive: PathBuf,
    /// Directory entries packed or extracted.
    pub dirs: u64,
    /// File and symlink entries packed or extracted.
    pub files: u64,
    /// File content bytes packed or extracted.
    pub bytes: u64,
    /// Entries that were skipped, in the order they were met.
    pub skipped: Vec<SkippedEntry>,
}

impl ArchiveSummary {
    pub(crate) fn new(archive: PathBuf) -> Self {
        Self {
            archive,
            ..Self::default()
        }
    }

    pub(crate) fn skip(&mut self, path: PathBuf, reason: impl Into<String>) {
        let reason = reason.into();
        log::warn!("Skipping {}: {reason}", path.display());
        self.skipped.push(SkippedEntry { path, reason });
    }

    /// Whether nothing was skipped.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}
