//! Periodic progress reporting.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, never, select, tick};

use crate::progress::{ProgressTracker, ReplicationProgress};

/// Callback receiving progress snapshots.
pub type ProgressCallback<'a> = dyn Fn(&ReplicationProgress) + Send + Sync + 'a;

/// Logs counters and feeds a callback on independent intervals until told to
/// stop.
pub struct ProgressReporter<'a> {
    tracker: &'a ProgressTracker,
    log_interval: Duration,
    observer_interval: Duration,
    on_progress: Option<&'a ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    /// Create a reporter. A zero interval disables that periodic output; the
    /// final report on stop is always emitted.
    #[must_use]
    pub const fn new(
        tracker: &'a ProgressTracker,
        log_interval: Duration,
        observer_interval: Duration,
        on_progress: Option<&'a ProgressCallback<'a>>,
    ) -> Self {
        Self {
            tracker,
            log_interval,
            observer_interval,
            on_progress,
        }
    }

    /// Report until `stop` receives a message or is disconnected.
    ///
    /// A final report is emitted on the way out so callbacks observe the
    /// terminal counters.
    pub fn run(&self, stop: &Receiver<()>) {
        let log_ticker = ticker(self.log_interval);
        let observer_ticker = if self.on_progress.is_some() {
            ticker(self.observer_interval)
        } else {
            never()
        };

        loop {
            select! {
                recv(log_ticker) -> _ => self.log_progress(&self.tracker.snapshot()),
                recv(observer_ticker) -> _ => self.notify(&self.tracker.snapshot()),
                recv(stop) -> _ => break,
            }
        }

        let progress = self.tracker.snapshot();
        self.log_progress(&progress);
        self.notify(&progress);
    }

    fn log_progress(&self, progress: &ReplicationProgress) {
        log::info!(
            "Progress: {} dirs, {}/{} files copied, {} bytes, {} pending, {} failures{}",
            progress.dirs_created,
            progress.files_copied,
            progress.files_enqueued,
            progress.bytes_copied,
            progress.pending,
            progress.failures,
            if progress.enumeration_complete {
                ""
            } else {
                " (still scanning)"
            }
        );
    }

    fn notify(&self, progress: &ReplicationProgress) {
        if let Some(callback) = self.on_progress {
            callback(progress);
        }
    }
}

fn ticker(interval: Duration) -> Receiver<Instant> {
    if interval.is_zero() {
        never()
    } else {
        tick(interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;
    use std::sync::Mutex;
    use std::thread;

    #[test]
    fn test_reports_periodically_and_on_stop() {
        let tracker = ProgressTracker::default();
        tracker.record_dir();
        let seen = Mutex::new(Vec::new());
        let callback = |progress: &ReplicationProgress| {
            seen.lock().unwrap().push(progress.dirs_created);
        };
        let reporter = ProgressReporter::new(
            &tracker,
            Duration::ZERO,
            Duration::from_millis(5),
            Some(&callback),
        );
        let (stop_tx, stop_rx) = bounded::<()>(0);

        thread::scope(|scope| {
            scope.spawn(|| reporter.run(&stop_rx));
            thread::sleep(Duration::from_millis(50));
            drop(stop_tx);
        });

        drop(reporter);
        let seen = seen.into_inner().unwrap();
        assert!(seen.len() >= 2);
        assert!(seen.iter().all(|dirs| *dirs == 1));
    }

    #[test]
    fn test_zero_interval_reports_once() {
        let tracker = ProgressTracker::default();
        let calls = Mutex::new(0);
        let callback = |_: &ReplicationProgress| {
            *calls.lock().unwrap() += 1;
        };
        let reporter =
            ProgressReporter::new(&tracker, Duration::ZERO, Duration::ZERO, Some(&callback));
        let (stop_tx, stop_rx) = bounded::<()>(0);

        thread::scope(|scope| {
            scope.spawn(|| reporter.run(&stop_rx));
            thread::sleep(Duration::from_millis(20));
            drop(stop_tx);
        });

        drop(reporter);
        assert_eq!(calls.into_inner().unwrap(), 1);
    }

    #[test]
    fn test_log_interval_does_not_drive_callback() {
        let tracker = ProgressTracker::default();
        let calls = Mutex::new(0);
        let callback = |_: &ReplicationProgress| {
            *calls.lock().unwrap() += 1;
        };
        let reporter = ProgressReporter::new(
            &tracker,
            Duration::from_millis(2),
            Duration::ZERO,
            Some(&callback),
        );
        let (stop_tx, stop_rx) = bounded::<()>(0);

        thread::scope(|scope| {
            scope.spawn(|| reporter.run(&stop_rx));
            thread::sleep(Duration::from_millis(30));
            drop(stop_tx);
        });

        drop(reporter);
        assert_eq!(calls.into_inner().unwrap(), 1);
    }
}
