//! Replication job orchestration.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::bounded;
use serde::Serialize;
use tree_mirror_paths::{Node, VisitError, resolve_absolute, walk};

use crate::cancel::CancelToken;
use crate::copy::{CopyTask, copy_file_contents};
use crate::error::CopyError;
use crate::executor::Executor;
use crate::failure::{FailureRecord, FailureStage};
use crate::options::ReplicationOptions;
use crate::producer::TaskProducer;
use crate::progress::ReplicationProgress;
use crate::reporter::{ProgressCallback, ProgressReporter};
use crate::state::JobState;

/// Outcome of a replication run that reached its terminal state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicationReport {
    /// Absolute source root.
    pub source: PathBuf,
    /// Absolute target root.
    pub target: PathBuf,
    /// Concurrency cap used for copies.
    pub parallelism: usize,
    /// Target directories created.
    pub dirs_created: u64,
    /// Files handed to the copy executor.
    pub files_enqueued: u64,
    /// Files copied successfully.
    pub files_copied: u64,
    /// Bytes written by successful copies.
    pub bytes_copied: u64,
    /// Highest number of copies in flight at once.
    pub peak_in_flight: usize,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
    /// Every recorded failure, in detection order.
    pub failures: Vec<FailureRecord>,
}

impl ReplicationReport {
    /// Whether the run finished without any recorded failure.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A validated replication of one source tree into one target location.
///
/// # Example
///
/// ```rust,ignore
/// use tree_mirror_copy::{ReplicationJob, ReplicationOptions};
///
/// let job = ReplicationJob::new("/data/in", "/backup/in", ReplicationOptions::default())?;
/// let report = job.run()?;
/// for failure in &report.failures {
///     eprintln!("{}: {}", failure.path.display(), failure.reason);
/// }
/// ```
pub struct ReplicationJob {
    source: PathBuf,
    target: PathBuf,
    options: ReplicationOptions,
    cancel: CancelToken,
    on_progress: Option<Box<ProgressCallback<'static>>>,
}

impl std::fmt::Debug for ReplicationJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplicationJob")
            .field("source", &self.source)
            .field("target", &self.target)
            .field("options", &self.options)
            .field("cancel", &self.cancel)
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

impl ReplicationJob {
    /// Validate and resolve the source and target paths.
    ///
    /// # Errors
    ///
    /// * If either path is empty or cannot be resolved
    /// * If the source does not exist
    /// * If the target is the source or lies inside it
    pub fn new(
        source: impl AsRef<Path>,
        target: impl AsRef<Path>,
        options: ReplicationOptions,
    ) -> Result<Self, CopyError> {
        let source = source.as_ref();
        let target = target.as_ref();
        if source.as_os_str().is_empty() {
            return Err(CopyError::EmptySourcePath);
        }
        if target.as_os_str().is_empty() {
            return Err(CopyError::EmptyTargetPath);
        }

        let source = resolve(source)?;
        let target = resolve(target)?;

        match fs::metadata(&source) {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(CopyError::SourceNotFound { path: source });
            }
            Err(e) => {
                return Err(CopyError::ResolvePath {
                    path: source,
                    io_error: e,
                });
            }
        }

        if target_overlaps_source(&source, &target) {
            return Err(CopyError::TargetInsideSource {
                source_path: source,
                target_path: target,
            });
        }

        Ok(Self {
            source,
            target,
            options,
            cancel: CancelToken::new(),
            on_progress: None,
        })
    }

    /// Absolute source root.
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Absolute target root.
    #[must_use]
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Options the job runs with.
    #[must_use]
    pub const fn options(&self) -> &ReplicationOptions {
        &self.options
    }

    /// A token that cancels this job from any thread.
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Observe progress snapshots every `observer_interval` and once at the end.
    #[must_use]
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ReplicationProgress) + Send + Sync + 'static,
    {
        self.on_progress = Some(Box::new(callback));
        self
    }

    /// Replicate the tree and wait until every enqueued copy has finished.
    ///
    /// Per-entry failures do not stop the run; they are returned in the report.
    ///
    /// # Errors
    ///
    /// * If the copy workers cannot be started
    /// * If traversal hits a fatal error (including entry errors without
    ///   `ignore_errors`)
    /// * If the job was cancelled
    pub fn run(self) -> Result<ReplicationReport, CopyError> {
        self.run_with_visit_hook(|_| Ok(()))
    }

    /// [`Self::run`] with `hook` called on every walked node before it is
    /// produced. An error from the hook aborts the walk like any visitor error.
    pub(crate) fn run_with_visit_hook<H>(
        self,
        mut hook: H,
    ) -> Result<ReplicationReport, CopyError>
    where
        H: FnMut(&Node<'_>) -> Result<(), VisitError>,
    {
        let started = Instant::now();
        let parallelism = self.options.effective_parallelism();
        let queue_capacity = self.options.effective_queue_capacity();
        let max_buffer_size = self.options.max_buffer_size;

        log::info!(
            "Replicating {} -> {} (parallelism {parallelism}, queue {queue_capacity})",
            self.source.display(),
            self.target.display()
        );

        let state = JobState::default();
        let cancel = &self.cancel;
        let executor = Executor::new(parallelism, &state, cancel)?;
        let reporter = ProgressReporter::new(
            &state.tracker,
            self.options.progress_interval,
            self.options.observer_interval,
            self.on_progress.as_deref(),
        );

        let (walk_result, dispatcher_result) = thread::scope(|scope| {
            let (task_tx, task_rx) = bounded::<CopyTask>(queue_capacity);
            let (stop_tx, stop_rx) = bounded::<()>(0);

            let reporter = &reporter;
            scope.spawn(move || reporter.run(&stop_rx));

            let executor = &executor;
            let dispatcher = scope.spawn(move || {
                executor.run(&task_rx, |task| {
                    copy_file_contents(task, max_buffer_size, cancel)
                });
            });

            let producer = TaskProducer::new(&self.target, task_tx, &state, cancel);
            let walk_result = walk(
                &self.source,
                |node, error| {
                    hook(node)?;
                    producer.visit(node, error)
                },
                self.options.ignore_errors,
            );
            state.tracker.mark_enumeration_complete();
            drop(producer);
            log::debug!("Enumeration complete, {} tasks pending", state.tracker.pending());

            let dispatcher_result = dispatcher.join();
            drop(stop_tx);
            (walk_result, dispatcher_result)
        });

        if dispatcher_result.is_err() {
            log::error!("Copy dispatcher panicked");
            return Err(CopyError::DispatcherPanicked);
        }

        let peak_in_flight = executor.peak_in_flight();
        drop(executor);

        let progress = state.tracker.snapshot();
        check_terminal_counts(&state, &progress);

        if cancel.is_cancelled() {
            log::warn!(
                "Replication cancelled after copying {} of {} files",
                progress.files_copied,
                progress.files_enqueued
            );
            return Err(CopyError::Cancelled);
        }

        if let Err(e) = walk_result {
            log::warn!(
                "Traversal aborted after {} directories and {} files ({} copied, {} failures)",
                progress.dirs_created,
                progress.files_enqueued,
                progress.files_copied,
                state.failures.len()
            );
            return Err(e.into());
        }

        if !state.failures.is_empty() {
            log::warn!("{} entries failed to replicate", state.failures.len());
        }

        let report = ReplicationReport {
            source: self.source,
            target: self.target,
            parallelism,
            dirs_created: progress.dirs_created,
            files_enqueued: progress.files_enqueued,
            files_copied: progress.files_copied,
            bytes_copied: progress.bytes_copied,
            peak_in_flight,
            elapsed: started.elapsed(),
            failures: state.failures.into_records(),
        };

        log::info!(
            "Replicated {} directories and {}/{} files ({} bytes) in {:.2?} with {} failures",
            report.dirs_created,
            report.files_copied,
            report.files_enqueued,
            report.bytes_copied,
            report.elapsed,
            report.failures.len()
        );

        Ok(report)
    }
}

fn resolve(path: &Path) -> Result<PathBuf, CopyError> {
    resolve_absolute(path).map_err(|e| CopyError::ResolvePath {
        path: path.to_path_buf(),
        io_error: e,
    })
}

/// Whether `target` is `source` or lies below it.
///
/// Paths are compared as given and again with symlinks resolved, so a target
/// reached through a link into the source is caught too.
fn target_overlaps_source(source: &Path, target: &Path) -> bool {
    if target.starts_with(source) {
        return true;
    }
    let Ok(source) = fs::canonicalize(source) else {
        return false;
    };
    canonicalize_existing(target).is_some_and(|target| target.starts_with(source))
}

/// Canonicalize the deepest existing ancestor of `path` and re-append the
/// components that do not exist yet.
fn canonicalize_existing(path: &Path) -> Option<PathBuf> {
    let mut existing = path;
    let mut missing = Vec::new();
    loop {
        if let Ok(canonical) = fs::canonicalize(existing) {
            return Some(missing.iter().rev().fold(canonical, |acc, name| acc.join(name)));
        }
        missing.push(existing.file_name()?);
        existing = existing.parent()?;
    }
}

/// Every enqueued file must end as a copy or a copy-stage failure.
fn check_terminal_counts(state: &JobState, progress: &ReplicationProgress) {
    let recorded_copy_failures = state.failures.count_stage(FailureStage::Copy) as u64;
    let consistent = progress.files_resolved() == progress.files_enqueued
        && recorded_copy_failures == progress.copy_failures
        && state.tracker.pending() == 0
        && state.tracker.is_enumeration_complete();
    if !consistent {
        log::error!(
            "Inconsistent terminal counters: {} copied + {} copy failures ({recorded_copy_failures} recorded) != {} enqueued ({} pending)",
            progress.files_copied,
            progress.copy_failures,
            progress.files_enqueued,
            progress.pending
        );
    }
    debug_assert!(consistent, "terminal counters out of balance: {progress:?}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;
    use tree_mirror_paths::{EntryError, WalkError};

    fn options() -> ReplicationOptions {
        ReplicationOptions::default()
            .with_parallelism(2)
            .with_progress_interval(Duration::ZERO)
    }

    fn run(source: &Path, target: &Path, options: ReplicationOptions) -> ReplicationReport {
        ReplicationJob::new(source, target, options)
            .unwrap()
            .run()
            .unwrap()
    }

    #[test]
    fn test_replicates_small_tree() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("src");
        let target = dir.path().join("dst");
        fs::create_dir_all(source.join("sub")).unwrap();
        fs::write(source.join("a.txt"), "hello").unwrap();
        fs::write(source.join("sub/b.txt"), "").unwrap();

        let report = run(&source, &target, options());

        assert_eq!(report.dirs_created, 2);
        assert_eq!(report.files_enqueued, 2);
        assert_eq!(report.files_copied, 2);
        assert_eq!(report.bytes_copied, 5);
        assert!(report.is_clean());
        assert_eq!(fs::read_to_string(target.join("a.txt")).unwrap(), "hello");
        assert_eq!(fs::read(target.join("sub/b.txt")).unwrap(), Vec::<u8>::new());
        assert!(report.peak_in_flight <= 2);
    }

    #[test]
    fn test_empty_directory() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("empty");
        let target = dir.path().join("copy");
        fs::create_dir(&source).unwrap();

        let report = run(&source, &target, options());

        assert_eq!(report.dirs_created, 1);
        assert_eq!(report.files_enqueued, 0);
        assert_eq!(report.files_copied, 0);
        assert!(report.is_clean());
        assert!(target.is_dir());
    }

    #[test]
    fn test_single_file_source() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("one.txt");
        let target = dir.path().join("out/one-copy.txt");
        fs::write(&source, "single").unwrap();

        let report = run(&source, &target, options());

        assert_eq!(report.dirs_created, 0);
        assert_eq!(report.files_copied, 1);
        assert_eq!(fs::read_to_string(&target).unwrap(), "single");
    }

    #[test]
    fn test_larger_tree_is_byte_identical() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("src");
        let target = dir.path().join("dst");
        let mut expected = Vec::new();
        for d in 0..4 {
            let sub = source.join(format!("dir{d}/nested{d}"));
            fs::create_dir_all(&sub).unwrap();
            for f in 0..12_usize {
                let content: Vec<u8> = (0..(f * 997 + d)).map(|i| (i % 256) as u8).collect();
                let path = sub.join(format!("file{f}.bin"));
                fs::write(&path, &content).unwrap();
                expected.push((path, content));
            }
        }

        let options = options().with_parallelism(4).with_queue_capacity(1);
        let report = run(&source, &target, options);

        assert_eq!(report.files_copied, 48);
        assert_eq!(report.dirs_created, 9);
        assert!(report.is_clean());
        assert!(report.peak_in_flight <= 4);
        for (path, content) in expected {
            let relative = path.strip_prefix(&source).unwrap();
            assert_eq!(fs::read(target.join(relative)).unwrap(), content);
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_is_isolated() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("src");
        let target = dir.path().join("dst");
        fs::create_dir(&source).unwrap();
        fs::write(source.join("a.txt"), "a").unwrap();
        fs::write(source.join("c.txt"), "c").unwrap();
        std::os::unix::fs::symlink(source.join("missing"), source.join("b.txt")).unwrap();

        let report = run(&source, &target, options());

        assert_eq!(report.files_enqueued, 3);
        assert_eq!(report.files_copied, 2);
        assert_eq!(report.failures.len(), 1);
        let failure = &report.failures[0];
        assert_eq!(failure.stage, FailureStage::Copy);
        assert!(failure.path.ends_with("b.txt"));
        assert!(failure.reason.contains("open"));
        assert!(target.join("a.txt").exists());
        assert!(target.join("c.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_fifo_in_source_does_not_hang() {
        use std::ffi::CString;
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new().unwrap();
        let source = dir.path().join("src");
        let target = dir.path().join("dst");
        fs::create_dir(&source).unwrap();
        fs::write(source.join("a.txt"), "a").unwrap();
        let fifo = CString::new(source.join("pipe").as_os_str().as_bytes()).unwrap();
        assert_eq!(unsafe { libc::mkfifo(fifo.as_ptr(), 0o644) }, 0);

        let (done_tx, done_rx) = bounded(1);
        let job = ReplicationJob::new(&source, &target, options()).unwrap();
        thread::spawn(move || done_tx.send(job.run()).unwrap());
        let report = done_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("replication did not finish")
            .unwrap();

        assert_eq!(report.files_enqueued, 1);
        assert_eq!(report.files_copied, 1);
        assert_eq!(report.failures.len(), 1);
        let failure = &report.failures[0];
        assert_eq!(failure.stage, FailureStage::Enqueue);
        assert!(failure.path.ends_with("pipe"));
        assert!(failure.reason.contains("unsupported file type"));
        assert_eq!(fs::read_to_string(target.join("a.txt")).unwrap(), "a");
        assert!(!target.join("pipe").exists());
    }

    /// Source with `a.txt`, `b.txt` and `c.txt` where `b.txt` disappears while
    /// `a.txt` is being visited, so its stat fails during the walk.
    fn run_with_vanishing_file(
        dir: &TempDir,
        ignore_errors: bool,
    ) -> Result<ReplicationReport, CopyError> {
        let source = dir.path().join("src");
        fs::create_dir(&source).unwrap();
        for name in ["a.txt", "b.txt", "c.txt"] {
            fs::write(source.join(name), name).unwrap();
        }

        ReplicationJob::new(
            &source,
            dir.path().join("dst"),
            options().with_ignore_errors(ignore_errors),
        )
        .unwrap()
        .run_with_visit_hook(|node| {
            if node.name == "a.txt" {
                fs::remove_file(source.join("b.txt")).unwrap();
            }
            Ok(())
        })
    }

    #[test]
    fn test_stat_failure_is_isolated_to_one_entry() {
        let dir = TempDir::new().unwrap();

        let report = run_with_vanishing_file(&dir, true).unwrap();

        assert_eq!(report.files_enqueued, 2);
        assert_eq!(report.files_copied, 2);
        assert_eq!(report.failures.len(), 1);
        let failure = &report.failures[0];
        assert_eq!(failure.stage, FailureStage::Walk);
        assert!(failure.path.ends_with("b.txt"));
        assert!(dir.path().join("dst/a.txt").exists());
        assert!(!dir.path().join("dst/b.txt").exists());
        assert!(dir.path().join("dst/c.txt").exists());
    }

    #[test]
    fn test_fatal_walk_error_waits_for_queued_copies() {
        let dir = TempDir::new().unwrap();

        let result = run_with_vanishing_file(&dir, false);

        match result {
            Err(CopyError::Walk(WalkError::Entry(EntryError::Stat { path, .. }))) => {
                assert!(path.ends_with("b.txt"));
            }
            other => panic!("expected stat error, got {other:?}"),
        }
        assert_eq!(fs::read_to_string(dir.path().join("dst/a.txt")).unwrap(), "a.txt");
        assert!(!dir.path().join("dst/c.txt").exists());
    }

    #[test]
    fn test_visitor_error_aborts_run() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("src");
        fs::create_dir(&source).unwrap();
        fs::write(source.join("a.txt"), "a").unwrap();
        fs::write(source.join("b.txt"), "b").unwrap();

        let result = ReplicationJob::new(&source, dir.path().join("dst"), options())
            .unwrap()
            .run_with_visit_hook(|node| {
                if node.name == "b.txt" {
                    return Err("stop at b".into());
                }
                Ok(())
            });

        match result {
            Err(CopyError::Walk(WalkError::Visit { path, source })) => {
                assert!(path.ends_with("b.txt"));
                assert_eq!(source.to_string(), "stop at b");
            }
            other => panic!("expected visit error, got {other:?}"),
        }
        assert!(dir.path().join("dst/a.txt").exists());
    }

    #[test]
    fn test_strict_mode_still_copies_clean_tree() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("src");
        fs::create_dir(&source).unwrap();
        fs::write(source.join("a.txt"), "a").unwrap();

        let report = run(
            &source,
            &dir.path().join("dst"),
            options().with_ignore_errors(false),
        );

        assert_eq!(report.files_copied, 1);
        assert!(report.is_clean());
    }

    #[test]
    fn test_cancelled_before_run() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("src");
        let target = dir.path().join("dst");
        fs::create_dir(&source).unwrap();
        fs::write(source.join("a.txt"), "a").unwrap();

        let job = ReplicationJob::new(&source, &target, options()).unwrap();
        job.cancel_token().cancel();

        assert!(matches!(job.run(), Err(CopyError::Cancelled)));
        assert!(!target.join("a.txt").exists());
    }

    #[test]
    fn test_progress_callback_sees_final_counts() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("src");
        fs::create_dir(&source).unwrap();
        for i in 0..5 {
            fs::write(source.join(format!("{i}.txt")), "x").unwrap();
        }

        let calls = Arc::new(AtomicUsize::new(0));
        let last_copied = Arc::new(AtomicUsize::new(0));
        let job = ReplicationJob::new(&source, dir.path().join("dst"), options())
            .unwrap()
            .on_progress({
                let calls = Arc::clone(&calls);
                let last_copied = Arc::clone(&last_copied);
                move |progress| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    last_copied.store(
                        usize::try_from(progress.files_copied).unwrap(),
                        Ordering::SeqCst,
                    );
                }
            });

        job.run().unwrap();

        assert!(calls.load(Ordering::SeqCst) >= 1);
        assert_eq!(last_copied.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_setup_errors() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("src");
        fs::create_dir(&source).unwrap();

        assert!(matches!(
            ReplicationJob::new("", dir.path().join("dst"), options()),
            Err(CopyError::EmptySourcePath)
        ));
        assert!(matches!(
            ReplicationJob::new(&source, "", options()),
            Err(CopyError::EmptyTargetPath)
        ));
        assert!(matches!(
            ReplicationJob::new(dir.path().join("missing"), dir.path().join("dst"), options()),
            Err(CopyError::SourceNotFound { .. })
        ));
        assert!(matches!(
            ReplicationJob::new(&source, source.join("inner"), options()),
            Err(CopyError::TargetInsideSource { .. })
        ));
        assert!(matches!(
            ReplicationJob::new(&source, &source, options()),
            Err(CopyError::TargetInsideSource { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_target_through_symlink_into_source_is_rejected() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("src");
        fs::create_dir(&source).unwrap();
        std::os::unix::fs::symlink(&source, dir.path().join("link")).unwrap();

        assert!(matches!(
            ReplicationJob::new(&source, dir.path().join("link/out/deeper"), options()),
            Err(CopyError::TargetInsideSource { .. })
        ));
        assert!(ReplicationJob::new(&source, dir.path().join("sibling/out"), options()).is_ok());
    }

    #[test]
    fn test_report_serializes_to_json() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("src");
        fs::create_dir(&source).unwrap();

        let report = run(&source, &dir.path().join("dst"), options());
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["dirsCreated"], 1);
        assert_eq!(json["filesCopied"], 0);
        assert!(json["failures"].as_array().unwrap().is_empty());
    }
}
