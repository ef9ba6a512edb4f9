//! Bounded copy executor.
//!
//! A single dispatch loop drains the task queue. Each task takes a concurrency
//! slot before it is spawned on the copy pool, and gives it back when the copy
//! returns, fails or panics. The loop ends once the queue is closed and empty;
//! the surrounding rayon scope then waits for every in-flight copy.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::panic::{self, AssertUnwindSafe};

use crossbeam_channel::Receiver;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::cancel::CancelToken;
use crate::copy::CopyTask;
use crate::error::{CopyError, TaskError};
use crate::failure::{FailureRecord, FailureStage};
use crate::slots::ConcurrencySlots;
use crate::state::JobState;

/// Runs copy tasks with at most `parallelism` in flight.
pub struct Executor<'a> {
    pool: ThreadPool,
    slots: ConcurrencySlots,
    state: &'a JobState,
    cancel: &'a CancelToken,
}

impl<'a> Executor<'a> {
    /// Start a copy pool with `parallelism` threads (at least one).
    ///
    /// # Errors
    ///
    /// * If the thread pool cannot be created
    pub fn new(
        parallelism: usize,
        state: &'a JobState,
        cancel: &'a CancelToken,
    ) -> Result<Self, CopyError> {
        let parallelism = parallelism.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(parallelism)
            .thread_name(|index| format!("tree-mirror-copy-{index}"))
            .build()?;

        let slots = ConcurrencySlots::new(parallelism);
        log::debug!("Started {} copy workers", slots.capacity());

        Ok(Self {
            pool,
            slots,
            state,
            cancel,
        })
    }

    /// Dispatch every task from `tasks` until the queue is closed and drained,
    /// then wait for all in-flight copies.
    ///
    /// `work` performs one copy and returns the bytes written. Its failures and
    /// panics are recorded per task and never stop the loop.
    pub fn run<W>(&self, tasks: &Receiver<CopyTask>, work: W)
    where
        W: Fn(&CopyTask) -> Result<u64, TaskError> + Sync,
    {
        let work = &work;
        self.pool.in_place_scope(|scope| {
            for task in tasks {
                let slot = self.slots.acquire();
                self.state.tracker.record_dispatched();
                scope.spawn(move |_| {
                    let _slot = slot;
                    self.execute(&task, work);
                });
            }
            log::debug!(
                "Copy queue drained, waiting for {} in-flight copies",
                self.slots.in_use()
            );
        });
    }

    /// Highest number of copies that ran at once.
    #[must_use]
    pub fn peak_in_flight(&self) -> usize {
        self.slots.peak()
    }

    fn execute<W>(&self, task: &CopyTask, work: &W)
    where
        W: Fn(&CopyTask) -> Result<u64, TaskError>,
    {
        let result = if self.cancel.is_cancelled() {
            Err(TaskError::Cancelled {
                path: task.source.clone(),
            })
        } else {
            panic::catch_unwind(AssertUnwindSafe(|| work(task))).unwrap_or_else(|payload| {
                Err(TaskError::from_panic(task.source.clone(), &*payload))
            })
        };

        match result {
            Ok(bytes) => {
                log::trace!("Copied {} ({bytes} bytes)", task.source.display());
                self.state.tracker.record_copied(bytes);
            }
            Err(error) => {
                self.state.fail(FailureRecord::new(
                    task.source.clone(),
                    FailureStage::Copy,
                    error.to_string(),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    fn task(index: usize) -> CopyTask {
        CopyTask {
            source: PathBuf::from(format!("/src/{index}")),
            target: PathBuf::from(format!("/dst/{index}")),
            size: 1,
        }
    }

    /// Feeds `count` tasks from a separate thread, as the walker does.
    fn run_tasks<W>(
        executor: &Executor<'_>,
        state: &JobState,
        count: usize,
        capacity: usize,
        work: W,
    ) where
        W: Fn(&CopyTask) -> Result<u64, TaskError> + Sync,
    {
        let (tx, rx) = bounded(capacity);
        thread::scope(|scope| {
            scope.spawn(move || {
                for index in 0..count {
                    state.tracker.begin_enqueue();
                    tx.send(task(index)).unwrap();
                    state.tracker.finish_enqueue();
                }
            });
            executor.run(&rx, work);
        });
    }

    #[test]
    fn test_never_exceeds_parallelism() {
        for parallelism in [1, 2, 4] {
            let state = JobState::default();
            let cancel = CancelToken::new();
            let executor = Executor::new(parallelism, &state, &cancel).unwrap();

            let running = AtomicUsize::new(0);
            let peak = AtomicUsize::new(0);
            run_tasks(&executor, &state, 40, parallelism * 2, |_| {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(2));
                running.fetch_sub(1, Ordering::SeqCst);
                Ok(1)
            });

            assert!(peak.load(Ordering::SeqCst) <= parallelism);
            assert!(executor.peak_in_flight() <= parallelism);
            let snapshot = state.tracker.snapshot();
            assert_eq!(snapshot.files_copied, 40);
            assert_eq!(snapshot.pending, 0);
        }
    }

    #[test]
    fn test_failures_are_isolated() {
        let state = JobState::default();
        let cancel = CancelToken::new();
        let executor = Executor::new(3, &state, &cancel).unwrap();

        run_tasks(&executor, &state, 10, 2, |task| {
            if task.source.ends_with("3") {
                Err(TaskError::Read {
                    path: task.source.clone(),
                    io_error: std::io::Error::other("disk on fire"),
                })
            } else {
                Ok(10)
            }
        });

        let snapshot = state.tracker.snapshot();
        assert_eq!(snapshot.files_copied, 9);
        assert_eq!(snapshot.bytes_copied, 90);
        assert_eq!(snapshot.copy_failures, 1);
        assert_eq!(state.failures.count_stage(FailureStage::Copy), 1);
    }

    #[test]
    fn test_panics_become_failures() {
        let state = JobState::default();
        let cancel = CancelToken::new();
        let executor = Executor::new(2, &state, &cancel).unwrap();

        run_tasks(&executor, &state, 5, 2, |task| {
            assert!(!task.source.ends_with("0"), "refusing first task");
            Ok(1)
        });

        let snapshot = state.tracker.snapshot();
        assert_eq!(snapshot.files_copied, 4);
        assert_eq!(snapshot.copy_failures, 1);
        assert_eq!(executor.slots.in_use(), 0);
    }

    #[test]
    fn test_cancelled_tasks_are_drained_as_failures() {
        let state = JobState::default();
        let cancel = CancelToken::new();
        cancel.cancel();
        let executor = Executor::new(2, &state, &cancel).unwrap();

        run_tasks(&executor, &state, 6, 1, |_| Ok(1));

        let snapshot = state.tracker.snapshot();
        assert_eq!(snapshot.files_copied, 0);
        assert_eq!(snapshot.copy_failures, 6);
        assert_eq!(snapshot.pending, 0);
    }

    #[test]
    fn test_empty_queue_terminates() {
        let state = JobState::default();
        let cancel = CancelToken::new();
        let executor = Executor::new(1, &state, &cancel).unwrap();

        run_tasks(&executor, &state, 0, 1, |_| Ok(1));

        assert_eq!(state.tracker.snapshot().files_copied, 0);
    }
}
