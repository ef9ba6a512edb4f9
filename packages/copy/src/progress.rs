//! Progress tracking for replication jobs.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use crate::failure::FailureStage;

/// Point-in-time view of a running job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplicationProgress {
    /// Target directories created so far.
    pub dirs_created: u64,
    /// Files handed to the copy queue so far.
    pub files_enqueued: u64,
    /// Files copied successfully so far.
    pub files_copied: u64,
    /// Bytes written by successful copies.
    pub bytes_copied: u64,
    /// Failures recorded so far, at any stage.
    pub failures: u64,
    /// Failures recorded by the copy executor.
    pub copy_failures: u64,
    /// Tasks enqueued but not yet dispatched to a copy slot.
    pub pending: usize,
    /// Whether the walker has finished.
    pub enumeration_complete: bool,
}

impl ReplicationProgress {
    /// Files that have finished copying, successfully or not.
    #[must_use]
    pub const fn files_resolved(&self) -> u64 {
        self.files_copied + self.copy_failures
    }

    /// Calculate progress as a percentage (0.0 to 100.0) of the files found so far.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percentage(&self) -> f64 {
        if self.files_enqueued == 0 {
            100.0
        } else {
            (self.files_resolved() as f64 / self.files_enqueued as f64) * 100.0
        }
    }
}

/// Thread-safe job counters shared by the producer, the executor and the reporter.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    dirs_created: AtomicU64,
    files_enqueued: AtomicU64,
    files_copied: AtomicU64,
    bytes_copied: AtomicU64,
    failures: AtomicU64,
    copy_failures: AtomicU64,
    pending: AtomicUsize,
    enumeration_complete: AtomicBool,
}

impl ProgressTracker {
    /// Count a created target directory.
    pub fn record_dir(&self) {
        self.dirs_created.fetch_add(1, Ordering::SeqCst);
    }

    /// Reserve a pending slot before a task is sent.
    pub fn begin_enqueue(&self) {
        self.pending.fetch_add(1, Ordering::SeqCst);
    }

    /// Count a task that reached the queue.
    pub fn finish_enqueue(&self) {
        self.files_enqueued.fetch_add(1, Ordering::SeqCst);
    }

    /// Release a pending slot for a task that never reached the queue.
    pub fn abort_enqueue(&self) {
        self.pending.fetch_sub(1, Ordering::SeqCst);
    }

    /// Mark a task as handed to a copy slot.
    pub fn record_dispatched(&self) {
        self.pending.fetch_sub(1, Ordering::SeqCst);
    }

    /// Count a successful copy.
    pub fn record_copied(&self, bytes: u64) {
        self.files_copied.fetch_add(1, Ordering::SeqCst);
        self.bytes_copied.fetch_add(bytes, Ordering::SeqCst);
    }

    /// Count a failure detected at the given stage.
    pub fn record_failure(&self, stage: FailureStage) {
        self.failures.fetch_add(1, Ordering::SeqCst);
        if stage == FailureStage::Copy {
            self.copy_failures.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Mark traversal as finished. Only the first call has an effect.
    ///
    /// Returns whether this call performed the transition.
    pub fn mark_enumeration_complete(&self) -> bool {
        !self.enumeration_complete.swap(true, Ordering::SeqCst)
    }

    /// Whether traversal has finished.
    #[must_use]
    pub fn is_enumeration_complete(&self) -> bool {
        self.enumeration_complete.load(Ordering::SeqCst)
    }

    /// Tasks enqueued but not yet dispatched.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Get a progress snapshot.
    #[must_use]
    pub fn snapshot(&self) -> ReplicationProgress {
        ReplicationProgress {
            dirs_created: self.dirs_created.load(Ordering::SeqCst),
            files_enqueued: self.files_enqueued.load(Ordering::SeqCst),
            files_copied: self.files_copied.load(Ordering::SeqCst),
            bytes_copied: self.bytes_copied.load(Ordering::SeqCst),
            failures: self.failures.load(Ordering::SeqCst),
            copy_failures: self.copy_failures.load(Ordering::SeqCst),
            pending: self.pending(),
            enumeration_complete: self.is_enumeration_complete(),
        }
    }
}
