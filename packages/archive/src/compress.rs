//! Packing a tree into a gzip-compressed tar archive.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use flate2::write::GzEncoder;
use flate2::{Compression, GzBuilder};
use tar::{Builder, EntryType, Header, HeaderMode};
use tree_mirror_paths::{Node, walk};

use crate::error::{ArchiveError, SourceEntryError};
use crate::resolve;
use crate::summary::ArchiveSummary;

/// Extension of generated archive names.
pub const ARCHIVE_EXTENSION: &str = "tar.gz";

type ArchiveBuilder = Builder<GzEncoder<BufWriter<File>>>;

/// What a single node added to the archive.
enum Packed {
    Nothing,
    Dir,
    File(u64),
    Symlink,
}

/// Failure while packing one node.
enum PackError {
    /// The source entry is unusable; the archive is still consistent.
    Source(SourceEntryError),
    /// The archive stream failed; nothing more can be written.
    Archive(ArchiveError),
}

/// Pack `source` into a gzip-compressed tar archive at `archive`.
///
/// When `archive` is an existing directory the archive is created inside it,
/// named after the source (see [`archive_path`]). Entries are stored with paths
/// relative to the source root in walk order; a file source is stored under
/// its own name. Directories, regular files and symlinks are archived; other
/// entry types are skipped. The gzip header comment is `dir` or `file`
/// depending on the source.
///
/// With `ignore_errors`, unreadable entries are skipped and listed in the
/// summary. Without it the first one aborts the run. Failures writing the
/// archive itself always abort. A partially written archive is left in place.
///
/// # Errors
///
/// * If the source does not exist or a path cannot be resolved
/// * If the archive cannot be created or written
/// * If an entry fails while `ignore_errors` is false
pub fn compress(
    source: impl AsRef<Path>,
    archive: impl AsRef<Path>,
    ignore_errors: bool,
) -> Result<ArchiveSummary, ArchiveError> {
    let source = resolve(source.as_ref())?;
    let is_dir = match fs::metadata(&source) {
        Ok(metadata) => metadata.is_dir(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ArchiveError::SourceNotFound { path: source });
        }
        Err(e) => {
            return Err(ArchiveError::Resolve {
                path: source,
                io_error: e,
            });
        }
    };
    let archive = archive_path(&source, is_dir, resolve(archive.as_ref())?);
    log::info!("Compressing {} -> {}", source.display(), archive.display());

    let mut builder = create_archive(&archive, is_dir)?;
    let mut summary = ArchiveSummary::new(archive.clone());
    let mut fatal = None;

    let walked = walk(
        &source,
        |node, error| {
            if let Some(error) = error {
                summary.skip(node.path.clone(), error.to_string());
                return Ok(());
            }
            if node.path == archive {
                log::debug!("Leaving out the archive itself");
                return Ok(());
            }

            match pack_node(&mut builder, node, &source) {
                Ok(Packed::Nothing) => {}
                Ok(Packed::Dir) => summary.dirs += 1,
                Ok(Packed::File(bytes)) => {
                    summary.files += 1;
                    summary.bytes += bytes;
                }
                Ok(Packed::Symlink) => summary.files += 1,
                Err(PackError::Source(error)) if ignore_errors => {
                    summary.skip(node.path.clone(), error.to_string());
                }
                Err(PackError::Source(error)) => return Err(Box::new(error)),
                Err(PackError::Archive(error)) => {
                    fatal = Some(error);
                    return Err("archive stream failed".into());
                }
            }
            Ok(())
        },
        ignore_errors,
    );
    if let Some(error) = fatal {
        return Err(error);
    }
    walked?;

    finish_archive(builder, &archive)?;
    log::info!(
        "Compressed {} directories and {} files ({} bytes) into {}, {} skipped",
        summary.dirs,
        summary.files,
        summary.bytes,
        archive.display(),
        summary.skipped.len()
    );

    Ok(summary)
}

/// Archive location for `source` given the requested `archive` path.
///
/// An existing directory gets a generated file name: the directory name for a
/// directory source, or the file name up to its first `.` for a file source.
#[must_use]
pub fn archive_path(source: &Path, source_is_dir: bool, archive: PathBuf) -> PathBuf {
    if !archive.is_dir() {
        return archive;
    }

    let name = source
        .file_name()
        .map_or_else(|| "archive".to_string(), |n| n.to_string_lossy().into_owned());
    let stem = if source_is_dir {
        name.as_str()
    } else {
        name.split('.').find(|part| !part.is_empty()).unwrap_or(name.as_str())
    };
    archive.join(format!("{stem}.{ARCHIVE_EXTENSION}"))
}

fn create_archive(archive: &Path, is_dir: bool) -> Result<ArchiveBuilder, ArchiveError> {
    let create_error = |e| ArchiveError::CreateArchive {
        path: archive.to_path_buf(),
        io_error: e,
    };
    if let Some(parent) = archive.parent() {
        fs::create_dir_all(parent).map_err(create_error)?;
    }
    let file = File::create(archive).map_err(create_error)?;

    let encoder = GzBuilder::new()
        .comment(if is_dir { "dir" } else { "file" })
        .write(BufWriter::new(file), Compression::default());
    Ok(Builder::new(encoder))
}

fn finish_archive(builder: ArchiveBuilder, archive: &Path) -> Result<(), ArchiveError> {
    let finish_error = |e| ArchiveError::Finish {
        path: archive.to_path_buf(),
        io_error: e,
    };
    let encoder = builder.into_inner().map_err(finish_error)?;
    let mut writer = encoder.finish().map_err(finish_error)?;
    writer.flush().map_err(finish_error)
}

/// Name of `node` inside the archive. `None` for a directory root.
fn entry_name(node: &Node<'_>, source: &Path) -> Option<PathBuf> {
    if !node.is_root() {
        return Some(node.relative_path());
    }
    if node.is_dir {
        return None;
    }
    source.file_name().map(PathBuf::from)
}

fn pack_node(
    builder: &mut ArchiveBuilder,
    node: &Node<'_>,
    source: &Path,
) -> Result<Packed, PackError> {
    let Some(name) = entry_name(node, source) else {
        return Ok(Packed::Nothing);
    };
    let append_error = |e| {
        PackError::Archive(ArchiveError::Append {
            path: node.path.clone(),
            io_error: e,
        })
    };

    if node.is_dir {
        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::Directory);
        header.set_size(0);
        header.set_mode(0o755);
        header.set_mtime(mtime(node.modified));
        builder
            .append_data(&mut header, &name, io::empty())
            .map_err(append_error)?;
        log::debug!("Packed directory {}", name.display());
        return Ok(Packed::Dir);
    }

    if node.is_symlink {
        let target = fs::read_link(&node.path).map_err(|e| {
            PackError::Source(SourceEntryError::ReadLink {
                path: node.path.clone(),
                io_error: e,
            })
        })?;
        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::Symlink);
        header.set_size(0);
        header.set_mode(0o777);
        header.set_mtime(mtime(node.modified));
        builder
            .append_link(&mut header, &name, &target)
            .map_err(append_error)?;
        log::debug!("Packed link {} -> {}", name.display(), target.display());
        return Ok(Packed::Symlink);
    }

    if !node.is_file {
        return Err(PackError::Source(SourceEntryError::UnsupportedFileType {
            path: node.path.clone(),
        }));
    }

    let open_error = |e| {
        PackError::Source(SourceEntryError::Open {
            path: node.path.clone(),
            io_error: e,
        })
    };
    let file = File::open(&node.path).map_err(open_error)?;
    let metadata = file.metadata().map_err(open_error)?;
    let mut header = Header::new_gnu();
    header.set_metadata_in_mode(&metadata, HeaderMode::Complete);
    let size = metadata.len();
    builder
        .append_data(&mut header, &name, file.take(size))
        .map_err(append_error)?;
    log::debug!("Packed {} ({size} bytes)", name.display());

    Ok(Packed::File(size))
}

fn mtime(modified: Option<SystemTime>) -> u64 {
    modified
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |since| since.as_secs())
}
