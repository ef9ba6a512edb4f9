//! Recorded per-entry failures.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;

/// Where in the pipeline a failure was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// The walker could not stat or list the entry.
    Walk,
    /// The mirrored target directory could not be created.
    CreateDir,
    /// The copy task could not be produced or enqueued.
    Enqueue,
    /// The copy executor failed on the file.
    Copy,
}

/// A non-fatal failure tied to one source path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    /// Source path of the failed entry.
    pub path: PathBuf,
    /// Pipeline stage that detected the failure.
    pub stage: FailureStage,
    /// Human-readable reason.
    pub reason: String,
}

impl FailureRecord {
    /// Create a new failure record.
    #[must_use]
    pub fn new(path: PathBuf, stage: FailureStage, reason: impl Into<String>) -> Self {
        Self {
            path,
            stage,
            reason: reason.into(),
        }
    }
}

/// Append-only failure list shared by the producer and the copy workers.
#[derive(Debug, Default)]
pub struct FailureLog {
    records: Mutex<Vec<FailureRecord>>,
}

impl FailureLog {
    /// Append a failure.
    pub fn push(&self, record: FailureRecord) {
        log::warn!("{}: {}", record.path.display(), record.reason);
        self.lock().push(record);
    }

    /// Number of failures recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no failures have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Number of failures recorded at the given stage.
    #[must_use]
    pub fn count_stage(&self, stage: FailureStage) -> usize {
        self.lock().iter().filter(|r| r.stage == stage).count()
    }

    /// Consume the log, returning the failures in the order they were recorded.
    #[must_use]
    pub fn into_records(self) -> Vec<FailureRecord> {
        self.records
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<FailureRecord>> {
        // Vec::push is all-or-nothing, so a poisoned list is still consistent.
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
