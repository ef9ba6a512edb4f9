//! Buffered single-file copy.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use crate::cancel::CancelToken;
use crate::error::TaskError;

/// Smallest buffer used for a copy, even for empty files.
const MIN_BUFFER_SIZE: usize = 8 * 1024;

/// One file to replicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyTask {
    /// Absolute source file path.
    pub source: PathBuf,
    /// Absolute target file path.
    pub target: PathBuf,
    /// Source size observed during the walk.
    pub size: u64,
}

/// Copy a file's bytes to its target path.
///
/// Missing parent directories of the target are created. The buffer is sized
/// from the size observed during the walk, capped at `max_buffer_size`, and
/// reused for every chunk. Cancellation is checked between chunks; a cancelled
/// copy leaves a partial target behind.
///
/// Returns the number of bytes written.
///
/// # Errors
///
/// * If the source cannot be opened or read
/// * If the target or its parent directory cannot be created or written
/// * If cancellation is requested before the copy finishes
pub fn copy_file_contents(
    task: &CopyTask,
    max_buffer_size: usize,
    cancel: &CancelToken,
) -> Result<u64, TaskError> {
    log::trace!(
        "Copying {} -> {}",
        task.source.display(),
        task.target.display()
    );

    let mut source = open_source(&task.source)?;

    if let Some(parent) = task.target.parent() {
        fs::create_dir_all(parent).map_err(|e| TaskError::CreateDir {
            path: parent.to_path_buf(),
            io_error: e,
        })?;
    }

    let mut target = File::create(&task.target).map_err(|e| TaskError::CreateTarget {
        path: task.target.clone(),
        io_error: e,
    })?;

    let mut buffer = vec![0_u8; buffer_size(task.size, max_buffer_size)];
    let mut copied = 0_u64;
    loop {
        if cancel.is_cancelled() {
            return Err(TaskError::Cancelled {
                path: task.source.clone(),
            });
        }

        let read = match source.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(TaskError::Read {
                    path: task.source.clone(),
                    io_error: e,
                });
            }
        };

        target
            .write_all(&buffer[..read])
            .map_err(|e| TaskError::Write {
                path: task.target.clone(),
                io_error: e,
            })?;
        copied += read as u64;
    }

    Ok(copied)
}

/// Open the source for reading and make sure it resolved to a regular file.
///
/// Symlinked sources are only known to be regular files once opened. On Unix
/// the open is non-blocking so a link to a FIFO cannot stall the worker.
fn open_source(path: &Path) -> Result<File, TaskError> {
    let mut options = OpenOptions::new();
    options.read(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.custom_flags(libc::O_NONBLOCK);
    }

    let open_error = |e| TaskError::OpenSource {
        path: path.to_path_buf(),
        io_error: e,
    };
    let file = options.open(path).map_err(open_error)?;
    if !file.metadata().map_err(open_error)?.is_file() {
        return Err(TaskError::UnsupportedFileType {
            path: path.to_path_buf(),
        });
    }

    Ok(file)
}

/// Buffer length for a file of `file_size` bytes.
///
/// One byte larger than the file so a single read reaches end of file.
fn buffer_size(file_size: u64, max_buffer_size: usize) -> usize {
    let wanted = usize::try_from(file_size.saturating_add(1)).unwrap_or(usize::MAX);
    wanted.clamp(MIN_BUFFER_SIZE, max_buffer_size.max(MIN_BUFFER_SIZE))
}
