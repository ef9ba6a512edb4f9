//! The `scan` command: a dry walk of a tree.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::{Path, PathBuf};

use serde::Serialize;
use tree_mirror_paths::{WalkError, walk};

/// One visited entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanEntry {
    /// Path relative to the scanned root (empty for the root).
    pub path: PathBuf,
    /// Size in bytes.
    pub size: u64,
    /// Whether the entry is a directory.
    pub is_dir: bool,
    /// Distance from the root.
    pub depth: usize,
    /// Why the entry could not be read, if it could not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Walk `root` and collect every entry in traversal order.
///
/// Unreadable entries are kept with their error and do not stop the scan.
///
/// # Errors
///
/// * If the root cannot be resolved or does not exist
pub fn scan_tree(root: &Path) -> Result<Vec<ScanEntry>, WalkError> {
    let mut entries = Vec::new();
    walk(
        root,
        |node, error| {
            entries.push(ScanEntry {
                path: node.relative_path(),
                size: node.size,
                is_dir: node.is_dir,
                depth: node.depth,
                error: error.map(ToString::to_string),
            });
            Ok(())
        },
        true,
    )?;
    Ok(entries)
}
