//! State shared by every actor of a running job.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use crate::failure::{FailureLog, FailureRecord};
use crate::progress::ProgressTracker;

/// Counters and failures of one job.
#[derive(Debug, Default)]
pub struct JobState {
    /// Running counters.
    pub tracker: ProgressTracker,
    /// Recorded failures.
    pub failures: FailureLog,
}

impl JobState {
    /// Record a failure and count it.
    pub fn fail(&self, record: FailureRecord) {
        self.tracker.record_failure(record.stage);
        self.failures.push(record);
    }
}
