//! Configuration types for tree-mirror.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Settings for copy runs. Unset values fall back to the engine defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyConfig {
    /// Maximum concurrent copies.
    pub parallelism: Option<usize>,

    /// Capacity of the task queue between the walker and the copy workers.
    pub queue_capacity: Option<usize>,

    /// Upper bound in bytes for a single file's copy buffer.
    pub max_buffer_size: Option<usize>,

    /// Milliseconds between progress log lines. Zero disables them.
    pub progress_interval_ms: Option<u64>,

    /// Whether unreadable entries are skipped instead of aborting the walk.
    pub ignore_errors: Option<bool>,
}

/// Tree-mirror configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// The `[copy]` table.
    #[serde(default)]
    pub copy: CopyConfig,
}

/// A configuration together with where it came from.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    /// The parsed configuration.
    pub config: Config,
    /// Path of the file it was read from, or `None` for built-in defaults.
    pub config_path: Option<PathBuf>,
}
