//! Absolute path resolution.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::env;
use std::io;
use std::path::{Path, PathBuf};

/// Resolve a path to a clean absolute path without touching the filesystem.
///
/// Relative paths are joined to the current directory. `.` and `..` components
/// are removed lexically, so the result does not depend on symlinks.
///
/// # Errors
///
/// * If the path is empty
/// * If the current directory cannot be determined
pub fn resolve_absolute(path: &Path) -> io::Result<PathBuf> {
    if path.as_os_str().is_empty() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "path is empty"));
    }

    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()?.join(path)
    };

    Ok(path_clean::clean(joined))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_absolute_cleans_components() {
        let resolved = resolve_absolute(Path::new("/data/./source/../target/")).unwrap();
        assert_eq!(resolved, PathBuf::from("/data/target"));
    }

    #[test]
    fn test_resolve_absolute_joins_current_dir() {
        let resolved = resolve_absolute(Path::new("some/dir")).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("some/dir"));
        assert_eq!(
            resolved.parent().and_then(Path::parent),
            Some(path_clean::clean(env::current_dir().unwrap()).as_path())
        );
    }

    #[test]
    fn test_resolve_absolute_rejects_empty() {
        let error = resolve_absolute(Path::new("")).unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::InvalidInput);
    }
}
