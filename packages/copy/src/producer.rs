//! Turns walked nodes into target directories and copy tasks.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use crossbeam_channel::Sender;
use tree_mirror_paths::{EntryError, Node, VisitError};

use crate::cancel::CancelToken;
use crate::copy::CopyTask;
use crate::error::{CopyError, TaskError};
use crate::failure::{FailureRecord, FailureStage};
use crate::state::JobState;

/// Walk visitor feeding the copy queue.
///
/// Owns the only sender of the queue, so dropping the producer closes it.
pub struct TaskProducer<'a> {
    target_root: &'a Path,
    queue: Sender<CopyTask>,
    state: &'a JobState,
    cancel: &'a CancelToken,
}

impl<'a> TaskProducer<'a> {
    /// Create a producer mirroring into `target_root`.
    #[must_use]
    pub const fn new(
        target_root: &'a Path,
        queue: Sender<CopyTask>,
        state: &'a JobState,
        cancel: &'a CancelToken,
    ) -> Self {
        Self {
            target_root,
            queue,
            state,
            cancel,
        }
    }

    /// Handle one walked node.
    ///
    /// Directories are created at their mirrored path. Regular files and
    /// symlinks are enqueued, blocking while the queue is full. Other entry
    /// types (FIFOs, sockets, devices) are skipped with a failure record, as
    /// are entry errors, creation failures and panics.
    ///
    /// # Errors
    ///
    /// * If the job was cancelled, which aborts the walk
    pub fn visit(&self, node: &Node<'_>, error: Option<&EntryError>) -> Result<(), VisitError> {
        if self.cancel.is_cancelled() {
            return Err(Box::new(CopyError::Cancelled));
        }

        if let Some(error) = error {
            self.state.fail(FailureRecord::new(
                node.path.clone(),
                FailureStage::Walk,
                error.to_string(),
            ));
            return Ok(());
        }

        let relative = node.relative_path();
        let target = if relative.as_os_str().is_empty() {
            self.target_root.to_path_buf()
        } else {
            self.target_root.join(relative)
        };
        match panic::catch_unwind(AssertUnwindSafe(|| self.produce(node, target))) {
            Ok(Ok(())) => {}
            Ok(Err((stage, error))) => {
                self.state
                    .fail(FailureRecord::new(node.path.clone(), stage, error.to_string()));
            }
            Err(payload) => {
                let error = TaskError::from_panic(node.path.clone(), &*payload);
                self.state.fail(FailureRecord::new(
                    node.path.clone(),
                    FailureStage::Enqueue,
                    error.to_string(),
                ));
            }
        }

        Ok(())
    }

    fn produce(&self, node: &Node<'_>, target: PathBuf) -> Result<(), (FailureStage, TaskError)> {
        if node.is_dir {
            fs::create_dir_all(&target).map_err(|e| {
                (
                    FailureStage::CreateDir,
                    TaskError::CreateDir {
                        path: target.clone(),
                        io_error: e,
                    },
                )
            })?;
            log::debug!("Created directory {}", target.display());
            self.state.tracker.record_dir();
            return Ok(());
        }

        if !node.is_file && !node.is_symlink {
            return Err((
                FailureStage::Enqueue,
                TaskError::UnsupportedFileType {
                    path: node.path.clone(),
                },
            ));
        }

        let task = CopyTask {
            source: node.path.clone(),
            target,
            size: node.size,
        };

        self.state.tracker.begin_enqueue();
        if self.queue.send(task).is_err() {
            self.state.tracker.abort_enqueue();
            return Err((
                FailureStage::Enqueue,
                TaskError::QueueClosed {
                    path: node.path.clone(),
                },
            ));
        }
        self.state.tracker.finish_enqueue();

        Ok(())
    }
}
