//! Configuration file discovery.
//!
//! A project-local `tree-mirror.toml` wins over the per-user file in the
//! platform configuration directory.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::{Path, PathBuf};

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "tree-mirror.toml";

const USER_CONFIG_DIR: &str = "tree-mirror";
const USER_CONFIG_FILE: &str = "config.toml";

/// Candidate configuration paths, in priority order.
///
/// # Arguments
///
/// * `working_dir` - Directory searched for a project-local config
#[must_use]
pub fn config_candidates(working_dir: &Path) -> Vec<PathBuf> {
    let mut candidates = vec![working_dir.join(LOCAL_CONFIG_FILE)];
    if let Some(config_dir) = dirs::config_dir() {
        candidates.push(config_dir.join(USER_CONFIG_DIR).join(USER_CONFIG_FILE));
    }
    candidates
}

/// Find the first existing configuration file.
#[must_use]
pub fn discover_config(working_dir: &Path) -> Option<PathBuf> {
    let found = config_candidates(working_dir)
        .into_iter()
        .find(|path| path.is_file());

    match &found {
        Some(path) => log::debug!("Found config file {}", path.display()),
        None => log::debug!("No config file found, using defaults"),
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_local_config_is_first_candidate() {
        let dir = TempDir::new().unwrap();

        let candidates = config_candidates(dir.path());

        assert_eq!(candidates[0], dir.path().join("tree-mirror.toml"));
    }

    #[test]
    fn test_discovers_local_config() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(LOCAL_CONFIG_FILE), "[copy]\n").unwrap();

        assert_eq!(
            discover_config(dir.path()),
            Some(dir.path().join(LOCAL_CONFIG_FILE))
        );
    }

    #[test]
    fn test_directory_named_like_config_is_ignored() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(LOCAL_CONFIG_FILE)).unwrap();

        assert_ne!(
            discover_config(dir.path()),
            Some(dir.path().join(LOCAL_CONFIG_FILE))
        );
    }
}
