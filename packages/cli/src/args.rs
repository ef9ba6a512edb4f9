//! CLI argument definitions.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// CLI arguments for tree-mirror.
#[derive(Debug, Parser)]
#[command(
    name = "tree-mirror",
    about = "Mirror a directory tree with bounded parallel copies",
    version
)]
pub struct Args {
    /// Command to run.
    #[command(subcommand)]
    pub command: Command,

    /// Config file to use instead of the discovered one.
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Disable progress bars (useful for CI environments).
    #[arg(long = "no-progress", global = true)]
    pub no_progress: bool,

    /// Enable verbose output.
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Copy a source tree into a target location.
    Copy(CopyArgs),
    /// Walk a tree and list every entry in traversal order.
    Scan(ScanArgs),
    /// Pack a file or directory into a .tar.gz archive.
    Compress(ArchiveArgs),
    /// Extract a .tar.gz archive into a directory.
    Decompress(ArchiveArgs),
}

/// Arguments of the `copy` command.
#[derive(Debug, clap::Args)]
pub struct CopyArgs {
    /// Source file or directory.
    #[arg(long, short = 's')]
    pub source: PathBuf,

    /// Target location.
    #[arg(long, short = 't')]
    pub target: PathBuf,

    /// Maximum concurrent copies (default: twice the CPU count).
    #[arg(long, short = 'p')]
    pub parallelism: Option<usize>,

    /// Capacity of the task queue (default: twice the parallelism).
    #[arg(long)]
    pub queue_capacity: Option<usize>,

    /// Abort on the first unreadable entry instead of skipping it.
    #[arg(long = "fail-fast")]
    pub fail_fast: bool,

    /// Print the final report as JSON.
    #[arg(long)]
    pub json: bool,

    /// Exit with status 2 when any entry failed.
    #[arg(long)]
    pub strict: bool,
}

/// Arguments of the `scan` command.
#[derive(Debug, clap::Args)]
pub struct ScanArgs {
    /// File or directory to walk.
    #[arg(index = 1)]
    pub path: PathBuf,

    /// Print entries as a JSON array.
    #[arg(long)]
    pub json: bool,
}

/// Arguments of the `compress` and `decompress` commands.
#[derive(Debug, clap::Args)]
pub struct ArchiveArgs {
    /// File or directory to pack, or the archive to extract.
    #[arg(long, short = 's')]
    pub source: PathBuf,

    /// Archive path or directory to place it in, or the extraction directory.
    #[arg(long, short = 't', default_value = ".")]
    pub target: PathBuf,

    /// Abort on the first unreadable entry instead of skipping it.
    #[arg(long = "fail-fast")]
    pub fail_fast: bool,

    /// Print the summary as JSON.
    #[arg(long)]
    pub json: bool,
}

impl Args {
    /// Determine if we should show progress bars.
    #[must_use]
    pub const fn should_show_progress(&self) -> bool {
        !self.no_progress
    }
}

impl CopyArgs {
    /// Walk error handling requested on the command line, if any.
    #[must_use]
    pub const fn ignore_errors_override(&self) -> Option<bool> {
        if self.fail_fast { Some(false) } else { None }
    }
}
