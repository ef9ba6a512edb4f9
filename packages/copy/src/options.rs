//! Tunables for a replication job.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::time::Duration;

/// Upper bound for a single file's copy buffer.
pub const DEFAULT_MAX_BUFFER_SIZE: usize = 110 * 1024 * 1024;

/// Interval between progress reports.
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_secs(3);

/// Interval between snapshots delivered to a progress callback.
pub const DEFAULT_OBSERVER_INTERVAL: Duration = Duration::from_millis(250);

/// Options controlling a replication job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicationOptions {
    /// Maximum concurrent copies. `None` or zero uses [`default_parallelism`].
    pub parallelism: Option<usize>,
    /// Capacity of the bounded task queue. `None` or zero uses twice the parallelism.
    pub queue_capacity: Option<usize>,
    /// Upper bound for a single file's copy buffer.
    pub max_buffer_size: usize,
    /// Interval between logged progress lines. Zero disables them.
    pub progress_interval: Duration,
    /// Interval between progress callback invocations. Zero limits the
    /// callback to the final snapshot.
    pub observer_interval: Duration,
    /// Whether walk errors on individual entries are recorded and skipped
    /// instead of aborting the job.
    pub ignore_errors: bool,
}

impl Default for ReplicationOptions {
    fn default() -> Self {
        Self {
            parallelism: None,
            queue_capacity: None,
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            observer_interval: DEFAULT_OBSERVER_INTERVAL,
            ignore_errors: true,
        }
    }
}

impl ReplicationOptions {
    /// Set the maximum concurrent copies.
    #[must_use]
    pub const fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = Some(parallelism);
        self
    }

    /// Set the bounded queue capacity.
    #[must_use]
    pub const fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    /// Set the copy buffer upper bound.
    #[must_use]
    pub const fn with_max_buffer_size(mut self, size: usize) -> Self {
        self.max_buffer_size = size;
        self
    }

    /// Set the progress report interval.
    #[must_use]
    pub const fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Set the progress callback interval.
    #[must_use]
    pub const fn with_observer_interval(mut self, interval: Duration) -> Self {
        self.observer_interval = interval;
        self
    }

    /// Set whether walk errors are skipped.
    #[must_use]
    pub const fn with_ignore_errors(mut self, ignore_errors: bool) -> Self {
        self.ignore_errors = ignore_errors;
        self
    }

    /// Parallelism after applying the default.
    #[must_use]
    pub fn effective_parallelism(&self) -> usize {
        match self.parallelism {
            Some(n) if n > 0 => n,
            _ => default_parallelism(),
        }
    }

    /// Queue capacity after applying the default.
    #[must_use]
    pub fn effective_queue_capacity(&self) -> usize {
        match self.queue_capacity {
            Some(n) if n > 0 => n,
            _ => self.effective_parallelism() * 2,
        }
    }
}

/// Default parallelism: twice the number of available CPUs.
#[must_use]
pub fn default_parallelism() -> usize {
    num_cpus::get().max(1) * 2
}
