//! Config file errors.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;

use thiserror::Error;

/// A config file that could not be turned into [`crate::Config`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read, or does not exist when named
    /// explicitly.
    #[error("Cannot read tree-mirror config {}: {io_error}", path.display())]
    Read {
        /// The config file.
        path: PathBuf,
        /// The underlying IO error.
        io_error: std::io::Error,
    },

    /// The file is not valid TOML or does not match the `[copy]` schema.
    #[error("Invalid tree-mirror config {}: {toml_error}", path.display())]
    Parse {
        /// The config file.
        path: PathBuf,
        /// The TOML deserialization error.
        toml_error: toml::de::Error,
    },

    /// Only `.toml` files are read.
    #[error("Config file {} is not a .toml file", path.display())]
    UnsupportedExtension {
        /// The rejected file.
        path: PathBuf,
    },
}
