//! Progress bar utilities for the CLI.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::sync::Arc;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tree_mirror_copy::ReplicationProgress;

/// Progress bar manager for replication runs.
pub struct ProgressManager {
    multi: Arc<MultiProgress>,
    enabled: bool,
}

impl ProgressManager {
    /// Create a new progress manager.
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            multi: Arc::new(MultiProgress::new()),
            enabled,
        }
    }

    /// Create a progress bar for a replication run.
    ///
    /// `estimated_files` sizes the bar up front; it grows if the walk finds more.
    /// If progress is disabled, returns a hidden progress bar.
    #[must_use]
    pub fn create_copy_bar(&self, estimated_files: u64) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let pb = self.multi.add(ProgressBar::new(estimated_files));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  {prefix} [{bar:25.green/dim}] {pos}/{len} files {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("━━─"),
        );
        pb.set_prefix("Copying");
        pb
    }

    /// Create a spinner shown while the source tree is estimated.
    #[must_use]
    pub fn create_scanning_spinner(&self) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_message("Scanning source tree...");
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }

    /// Clear any active progress bars (for clean output after completion).
    pub fn clear(&self) {
        self.multi.clear().ok();
    }
}

/// Apply a progress snapshot to a copy bar.
pub fn update_copy_bar(bar: &ProgressBar, progress: &ReplicationProgress) {
    if bar.length().is_some_and(|len| progress.files_enqueued > len) {
        bar.set_length(progress.files_enqueued);
    }
    bar.set_position(progress.files_resolved());
    if progress.failures > 0 {
        bar.set_message(format!("({} failed)", progress.failures));
    }
}
