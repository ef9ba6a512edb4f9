//! Extracting a gzip-compressed tar archive.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::Path;

use flate2::read::GzDecoder;
use tar::{Archive, EntryType};

use crate::error::ArchiveError;
use crate::resolve;
use crate::summary::ArchiveSummary;

/// Extract the archive at `archive` into the directory `target`.
///
/// `target` is created if missing and existing files are overwritten. Entries
/// whose path would land outside `target` are skipped.
///
/// With `ignore_errors`, entries that cannot be written are skipped and listed
/// in the summary. Without it the first one aborts the run. A corrupt archive
/// stream always aborts; entries already extracted stay in place.
///
/// # Errors
///
/// * If the archive does not exist or is a directory
/// * If the target directory cannot be created
/// * If the archive cannot be opened or decoded
/// * If an entry fails while `ignore_errors` is false
pub fn decompress(
    archive: impl AsRef<Path>,
    target: impl AsRef<Path>,
    ignore_errors: bool,
) -> Result<ArchiveSummary, ArchiveError> {
    let archive = resolve(archive.as_ref())?;
    match fs::metadata(&archive) {
        Ok(metadata) if metadata.is_dir() => {
            return Err(ArchiveError::SourceIsDirectory { path: archive });
        }
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ArchiveError::SourceNotFound { path: archive });
        }
        Err(e) => {
            return Err(ArchiveError::Resolve {
                path: archive,
                io_error: e,
            });
        }
    }
    let target = resolve(target.as_ref())?;
    log::info!("Decompressing {} -> {}", archive.display(), target.display());

    fs::create_dir_all(&target).map_err(|e| ArchiveError::CreateDir {
        path: target.clone(),
        io_error: e,
    })?;
    let file = File::open(&archive).map_err(|e| ArchiveError::OpenArchive {
        path: archive.clone(),
        io_error: e,
    })?;

    let read_error = |e| ArchiveError::ReadArchive {
        path: archive.clone(),
        io_error: e,
    };
    let mut reader = Archive::new(GzDecoder::new(BufReader::new(file)));
    let mut summary = ArchiveSummary::new(archive.clone());

    for entry in reader.entries().map_err(read_error)? {
        let mut entry = entry.map_err(read_error)?;
        let path = entry.path().map_err(read_error)?.into_owned();
        let kind = entry.header().entry_type();
        let size = entry.size();

        match entry.unpack_in(&target) {
            Ok(true) => {
                log::debug!("Extracted {}", path.display());
                if kind == EntryType::Directory {
                    summary.dirs += 1;
                } else {
                    summary.files += 1;
                    if kind.is_file() {
                        summary.bytes += size;
                    }
                }
            }
            Ok(false) => summary.skip(path, "entry path points outside the target directory"),
            Err(e) if ignore_errors => summary.skip(path, e.to_string()),
            Err(e) => {
                return Err(ArchiveError::Extract { path, io_error: e });
            }
        }
    }

    log::info!(
        "Decompressed {} directories and {} files ({} bytes) into {}, {} skipped",
        summary.dirs,
        summary.files,
        summary.bytes,
        target.display(),
        summary.skipped.len()
    );

    Ok(summary)
}
