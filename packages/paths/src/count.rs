//! Fast tree estimation using jwalk.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::Path;

/// Approximate shape of a directory tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeEstimate {
    /// Number of directories, including the root.
    pub dirs: u64,
    /// Number of non-directory entries.
    pub files: u64,
    /// Sum of non-directory entry sizes.
    pub bytes: u64,
}

/// Estimate the number of entries below a path.
///
/// - If path is a file: one file of its size
/// - If path is a directory: recursive counts, the root included in `dirs`
/// - If path doesn't exist: all zeros
///
/// Uses `jwalk` with sorting disabled for speed. Unreadable entries are skipped,
/// so the result is a lower bound suitable for sizing progress bars.
#[must_use]
pub fn estimate_tree(path: &Path) -> TreeEstimate {
    let Ok(metadata) = path.metadata() else {
        return TreeEstimate::default();
    };

    if !metadata.is_dir() {
        return TreeEstimate {
            dirs: 0,
            files: 1,
            bytes: metadata.len(),
        };
    }

    jwalk::WalkDir::new(path)
        .skip_hidden(false)
        .follow_links(false)
        .sort(false)
        .into_iter()
        .filter_map(Result::ok)
        .fold(TreeEstimate::default(), |mut estimate, entry| {
            if entry.file_type().is_dir() {
                estimate.dirs += 1;
            } else {
                estimate.files += 1;
                estimate.bytes += entry.metadata().map(|m| m.len()).unwrap_or(0);
            }
            estimate
        })
}
