//! Merging of config file values and command-line flags.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::time::Duration;

use tree_mirror_config::CopyConfig;
use tree_mirror_copy::ReplicationOptions;

use crate::args::CopyArgs;

/// Refresh interval used while a progress bar is drawn.
const BAR_REFRESH_INTERVAL: Duration = Duration::from_millis(250);

/// Build job options: flags override the config file, which overrides defaults.
#[must_use]
pub fn replication_options(
    config: &CopyConfig,
    args: &CopyArgs,
    show_progress: bool,
) -> ReplicationOptions {
    let mut options = ReplicationOptions::default();

    options.parallelism = args.parallelism.or(config.parallelism);
    options.queue_capacity = args.queue_capacity.or(config.queue_capacity);
    if let Some(size) = config.max_buffer_size {
        options.max_buffer_size = size;
    }
    if let Some(ms) = config.progress_interval_ms {
        options.progress_interval = Duration::from_millis(ms);
    }
    if let Some(ignore_errors) = args.ignore_errors_override().or(config.ignore_errors) {
        options.ignore_errors = ignore_errors;
    }

    // Only a drawn bar needs snapshots before the end; the log cadence is
    // left alone either way.
    options.observer_interval = if show_progress {
        BAR_REFRESH_INTERVAL
    } else {
        Duration::ZERO
    };

    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tree_mirror_copy::{DEFAULT_MAX_BUFFER_SIZE, DEFAULT_PROGRESS_INTERVAL};

    fn copy_args() -> CopyArgs {
        CopyArgs {
            source: PathBuf::from("in"),
            target: PathBuf::from("out"),
            parallelism: None,
            queue_capacity: None,
            fail_fast: false,
            json: false,
            strict: false,
        }
    }

    #[test]
    fn test_defaults_without_config_or_flags() {
        let options = replication_options(&CopyConfig::default(), &copy_args(), false);

        assert_eq!(options.parallelism, None);
        assert!(options.ignore_errors);
        assert_eq!(options.observer_interval, Duration::ZERO);
        assert_eq!(options.max_buffer_size, DEFAULT_MAX_BUFFER_SIZE);
        assert_eq!(options.progress_interval, DEFAULT_PROGRESS_INTERVAL);
    }

    #[test]
    fn test_config_values_apply() {
        let config = CopyConfig {
            parallelism: Some(3),
            queue_capacity: Some(5),
            max_buffer_size: Some(4096),
            progress_interval_ms: Some(1000),
            ignore_errors: Some(false),
        };

        let options = replication_options(&config, &copy_args(), false);

        assert_eq!(options.parallelism, Some(3));
        assert_eq!(options.queue_capacity, Some(5));
        assert_eq!(options.max_buffer_size, 4096);
        assert_eq!(options.progress_interval, Duration::from_secs(1));
        assert!(!options.ignore_errors);
    }

    #[test]
    fn test_flags_override_config() {
        let config = CopyConfig {
            parallelism: Some(3),
            ignore_errors: Some(true),
            ..CopyConfig::default()
        };
        let args = CopyArgs {
            parallelism: Some(16),
            fail_fast: true,
            ..copy_args()
        };

        let options = replication_options(&config, &args, false);

        assert_eq!(options.parallelism, Some(16));
        assert!(!options.ignore_errors);
    }

    #[test]
    fn test_progress_bar_sets_observer_interval_only() {
        let options = replication_options(&CopyConfig::default(), &copy_args(), true);
        assert_eq!(options.observer_interval, BAR_REFRESH_INTERVAL);
        assert_eq!(options.progress_interval, DEFAULT_PROGRESS_INTERVAL);

        let config = CopyConfig {
            progress_interval_ms: Some(0),
            ..CopyConfig::default()
        };
        let options = replication_options(&config, &copy_args(), true);
        assert_eq!(options.observer_interval, BAR_REFRESH_INTERVAL);
        assert!(options.progress_interval.is_zero());
    }
}
