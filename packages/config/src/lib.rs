//! Configuration loading for tree-mirror.
//!
//! Settings live in a TOML file with a `[copy]` table. The file is taken from
//! an explicit path when one is given, otherwise discovered in the working
//! directory or the user's configuration directory. No file means defaults.
//!
//! # Example
//!
//! ```rust,ignore
//! use tree_mirror_config::load_or_discover;
//!
//! let loaded = load_or_discover(None, &std::env::current_dir()?)?;
//! println!("parallelism: {:?}", loaded.config.copy.parallelism);
//! ```

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

mod discovery;
mod error;
mod toml_loader;
mod types;

pub use discovery::{LOCAL_CONFIG_FILE, config_candidates, discover_config};
pub use error::ConfigError;
pub use toml_loader::load_toml_config;
pub use types::{Config, CopyConfig, LoadedConfig};

use std::ffi::OsStr;
use std::path::Path;

/// Load the `.toml` config file at `path`.
///
/// # Errors
///
/// * If the file does not have a `.toml` extension
/// * If the file cannot be read
/// * If the file cannot be parsed
pub fn load_config(path: &Path) -> Result<LoadedConfig, ConfigError> {
    if path.extension() != Some(OsStr::new("toml")) {
        return Err(ConfigError::UnsupportedExtension {
            path: path.to_path_buf(),
        });
    }

    Ok(LoadedConfig {
        config: load_toml_config(path)?,
        config_path: Some(path.to_path_buf()),
    })
}

/// Load `explicit` if given, else the discovered config, else defaults.
///
/// # Errors
///
/// * If the chosen file cannot be read or parsed
pub fn load_or_discover(
    explicit: Option<&Path>,
    working_dir: &Path,
) -> Result<LoadedConfig, ConfigError> {
    if let Some(path) = explicit {
        return load_config(path);
    }

    match discover_config(working_dir) {
        Some(path) => load_config(&path),
        None => Ok(LoadedConfig::default()),
    }
}
