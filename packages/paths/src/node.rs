//! Filesystem entries discovered during a walk.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::ffi::{OsStr, OsString};
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A single filesystem entry.
///
/// The parent reference is borrowed from the walker's call stack and only lives
/// as long as the visit. Nodes never own their relatives.
#[derive(Debug, Clone)]
pub struct Node<'a> {
    /// File name of the entry.
    pub name: OsString,
    /// Absolute path of the entry.
    pub path: PathBuf,
    /// Size in bytes as reported by the filesystem.
    pub size: u64,
    /// Whether the entry is a directory.
    pub is_dir: bool,
    /// Whether the entry is a regular file.
    pub is_file: bool,
    /// Whether the entry is a symbolic link. Only the walk root is stat'ed
    /// through links, so this is false for a root given as a link.
    pub is_symlink: bool,
    /// Last modification time, when available.
    pub modified: Option<SystemTime>,
    /// Distance from the walk root (the root is 0).
    pub depth: usize,
    parent: Option<&'a Node<'a>>,
}

impl<'a> Node<'a> {
    /// Build a node from stat results.
    pub(crate) fn new(
        name: OsString,
        path: PathBuf,
        metadata: &Metadata,
        depth: usize,
        parent: Option<&'a Node<'a>>,
    ) -> Self {
        let file_type = metadata.file_type();
        Self {
            name,
            path,
            size: metadata.len(),
            is_dir: file_type.is_dir(),
            is_file: file_type.is_file(),
            is_symlink: file_type.is_symlink(),
            modified: metadata.modified().ok(),
            depth,
            parent,
        }
    }

    /// Build a placeholder for an entry that could not be stat'ed.
    ///
    /// Only the name, path, depth and parent are populated.
    pub(crate) fn unresolved(path: PathBuf, depth: usize, parent: Option<&'a Node<'a>>) -> Self {
        Self {
            name: path.file_name().map(OsStr::to_os_string).unwrap_or_default(),
            path,
            size: 0,
            is_dir: false,
            is_file: false,
            is_symlink: false,
            modified: None,
            depth,
            parent,
        }
    }

    /// The directory this node was discovered in, if it is not the root.
    #[must_use]
    pub const fn parent(&self) -> Option<&'a Node<'a>> {
        self.parent
    }

    /// Whether this node is the walk root.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Path of this node relative to the walk root.
    ///
    /// Empty for the root itself.
    #[must_use]
    pub fn relative_path(&self) -> PathBuf {
        let mut names: Vec<&OsStr> = Vec::with_capacity(self.depth);
        let mut current = Some(self);
        while let Some(node) = current {
            if node.is_root() {
                break;
            }
            names.push(&node.name);
            current = node.parent;
        }
        names.iter().rev().map(Path::new).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_relative_path_follows_parent_chain() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        fs::write(dir.path().join("a/b/c.txt"), "x").unwrap();

        let root_meta = fs::metadata(dir.path()).unwrap();
        let root = Node::new(
            OsString::from("root"),
            dir.path().to_path_buf(),
            &root_meta,
            0,
            None,
        );
        let a_meta = fs::metadata(dir.path().join("a")).unwrap();
        let a = Node::new(
            OsString::from("a"),
            dir.path().join("a"),
            &a_meta,
            1,
            Some(&root),
        );
        let b_meta = fs::metadata(dir.path().join("a/b")).unwrap();
        let b = Node::new(
            OsString::from("b"),
            dir.path().join("a/b"),
            &b_meta,
            2,
            Some(&a),
        );
        let c = Node::unresolved(dir.path().join("a/b/c.txt"), 3, Some(&b));

        assert!(root.is_root());
        assert_eq!(root.relative_path(), PathBuf::new());
        assert_eq!(a.relative_path(), PathBuf::from("a"));
        assert_eq!(c.relative_path(), PathBuf::from("a/b/c.txt"));
        assert_eq!(c.parent().map(|p| p.name.clone()), Some(OsString::from("b")));
    }

    #[test]
    fn test_unresolved_node_has_zeroed_fields() {
        let node = Node::unresolved(PathBuf::from("/tmp/missing.bin"), 1, None);

        assert_eq!(node.name, OsString::from("missing.bin"));
        assert_eq!(node.size, 0);
        assert!(!node.is_dir);
        assert!(!node.is_file);
        assert!(!node.is_symlink);
        assert!(node.modified.is_none());
    }
}
