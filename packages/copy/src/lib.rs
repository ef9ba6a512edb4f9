//! Concurrent directory tree replication.
//!
//! This crate mirrors a source tree into a target location:
//!
//! * The walker from `tree_mirror_paths` drives a producer that recreates
//!   directories and enqueues one task per file on a bounded channel
//! * A dispatcher hands tasks to a `rayon` pool, never exceeding the configured
//!   number of concurrent copies
//! * Per-entry failures are recorded and returned instead of aborting the run
//! * Progress counters are logged periodically and exposed through a callback
//! * A [`CancelToken`] stops traversal and interrupts in-flight copies
//!
//! # Example
//!
//! ```rust,ignore
//! use tree_mirror_copy::{ReplicationJob, ReplicationOptions};
//!
//! let job = ReplicationJob::new(source, target, ReplicationOptions::default().with_parallelism(8))?
//!     .on_progress(|progress| {
//!         println!("{}/{} files copied", progress.files_copied, progress.files_enqueued);
//!     });
//! let report = job.run()?;
//! println!("{} failures", report.failures.len());
//! ```

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

mod cancel;
mod copy;
mod error;
mod executor;
mod failure;
mod job;
mod options;
mod producer;
mod progress;
mod reporter;
mod slots;
mod state;

pub use cancel::CancelToken;
pub use copy::{CopyTask, copy_file_contents};
pub use error::{CopyError, TaskError};
pub use failure::{FailureRecord, FailureStage};
pub use job::{ReplicationJob, ReplicationReport};
pub use options::{
    DEFAULT_MAX_BUFFER_SIZE, DEFAULT_OBSERVER_INTERVAL, DEFAULT_PROGRESS_INTERVAL,
    ReplicationOptions, default_parallelism,
};
pub use progress::ReplicationProgress;
pub use reporter::ProgressCallback;
