//! Recursive, sorted directory traversal.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::Path;

use crate::error::{EntryError, VisitError, WalkError};
use crate::node::Node;
use crate::resolve::resolve_absolute;

/// Walk a directory tree depth-first in sorted-name order.
///
/// The root is visited first, then the children of every directory in
/// lexicographic (byte-wise) name order. Directories are always descended into;
/// symlinks below the root are reported as non-directory nodes and never followed.
///
/// When an entry cannot be stat'ed, or a directory cannot be listed, `visit` is
/// called with the affected node and the error. With `ignore_errors` the walk then
/// continues with the next sibling; otherwise the entry error ends the walk.
///
/// An error returned from `visit` always ends the walk, regardless of
/// `ignore_errors`.
///
/// # Arguments
///
/// * `root` - Path to walk (file or directory)
/// * `visit` - Called once per discovered node
/// * `ignore_errors` - Whether per-entry errors are recoverable
///
/// # Errors
///
/// * If the root path cannot be resolved or does not exist
/// * If an entry fails and `ignore_errors` is false
/// * If `visit` returns an error
pub fn walk<F>(root: impl AsRef<Path>, visit: F, ignore_errors: bool) -> Result<Node<'static>, WalkError>
where
    F: FnMut(&Node<'_>, Option<&EntryError>) -> Result<(), VisitError>,
{
    let given = root.as_ref();
    let path = resolve_absolute(given).map_err(|e| WalkError::Resolve {
        path: given.to_path_buf(),
        io_error: e,
    })?;

    log::debug!("Walking {}", path.display());

    let metadata = match fs::metadata(&path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(WalkError::PathNotFound { path });
        }
        Err(e) => return Err(WalkError::PathStat { path, io_error: e }),
    };

    let name = path
        .file_name()
        .map_or_else(|| path.clone().into_os_string(), OsString::from);
    let root = Node::new(name, path, &metadata, 0, None);

    let mut walker = Walker {
        visit,
        ignore_errors,
    };
    walker.call(&root, None)?;
    if root.is_dir {
        walker.descend(&root)?;
    }

    Ok(root)
}

struct Walker<F> {
    visit: F,
    ignore_errors: bool,
}

impl<F> Walker<F>
where
    F: FnMut(&Node<'_>, Option<&EntryError>) -> Result<(), VisitError>,
{
    fn descend<'d>(&mut self, dir: &'d Node<'d>) -> Result<(), WalkError> {
        let names = match read_sorted_names(&dir.path) {
            Ok(names) => names,
            Err(e) => {
                let error = EntryError::ReadDir {
                    path: dir.path.clone(),
                    io_error: e,
                };
                return self.report(dir, error);
            }
        };

        for name in names {
            let path = dir.path.join(&name);
            match fs::symlink_metadata(&path) {
                Ok(metadata) => {
                    let child = Node::new(name, path, &metadata, dir.depth + 1, Some(dir));
                    self.call(&child, None)?;
                    if child.is_dir {
                        self.descend(&child)?;
                    }
                }
                Err(e) => {
                    let child = Node::unresolved(path.clone(), dir.depth + 1, Some(dir));
                    self.report(&child, EntryError::Stat { path, io_error: e })?;
                }
            }
        }

        Ok(())
    }

    fn report(&mut self, node: &Node<'_>, error: EntryError) -> Result<(), WalkError> {
        self.call(node, Some(&error))?;
        if self.ignore_errors {
            log::debug!("Ignoring entry error: {error}");
            Ok(())
        } else {
            Err(WalkError::Entry(error))
        }
    }

    fn call(&mut self, node: &Node<'_>, error: Option<&EntryError>) -> Result<(), WalkError> {
        (self.visit)(node, error).map_err(|source| WalkError::Visit {
            path: node.path.clone(),
            source,
        })
    }
}

fn read_sorted_names(dir: &Path) -> io::Result<Vec<OsString>> {
    let mut names = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.file_name()))
        .collect::<io::Result<Vec<_>>>()?;
    names.sort();
    Ok(names)
}
