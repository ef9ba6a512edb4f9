//! tree-mirror CLI entry point.
//!
//! Mirrors a directory tree into a target location with bounded parallel copies.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

mod args;
mod output;
mod progress;
mod scan;
mod settings;

use std::env;

use clap::Parser;

use args::{ArchiveArgs, Args, Command, CopyArgs, ScanArgs};
use progress::ProgressManager;
use tree_mirror_config::{Config, load_or_discover};
use tree_mirror_copy::ReplicationJob;
use tree_mirror_paths::estimate_tree;

/// Exit status for fatal and setup errors.
const EXIT_FATAL: i32 = 1;

/// Exit status when `--strict` is set and entries failed.
const EXIT_FAILURES: i32 = 2;

fn main() {
    let args = Args::parse();

    // Set up logging
    if args.verbose {
        // SAFETY: We're setting this before any other threads are spawned
        unsafe {
            env::set_var("RUST_LOG", "debug");
        }
    }
    pretty_env_logger::init();

    match run(&args) {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            output::print_error(&e.to_string());
            std::process::exit(EXIT_FATAL);
        }
    }
}

/// Main application logic. Returns the process exit status.
fn run(args: &Args) -> Result<i32, Box<dyn std::error::Error>> {
    match &args.command {
        Command::Copy(copy) => {
            let cwd = env::current_dir()?;
            let loaded = load_or_discover(args.config.as_deref(), &cwd)?;
            if let Some(path) = &loaded.config_path {
                log::info!("Using config {}", path.display());
            }
            run_copy(copy, &loaded.config, args.should_show_progress())
        }
        Command::Scan(scan) => run_scan(scan),
        Command::Compress(archive) => run_archive(archive, ArchiveDirection::Compress),
        Command::Decompress(archive) => run_archive(archive, ArchiveDirection::Decompress),
    }
}

fn run_copy(
    copy: &CopyArgs,
    config: &Config,
    show_progress: bool,
) -> Result<i32, Box<dyn std::error::Error>> {
    let show_progress = show_progress && !copy.json;
    let options = settings::replication_options(&config.copy, copy, show_progress);
    let job = ReplicationJob::new(&copy.source, &copy.target, options)?;

    if !copy.json {
        output::print_header("Tree Mirror");
        output::print_paths(job.source(), job.target());
    }

    let cancel = job.cancel_token();
    if let Err(e) = ctrlc::set_handler(move || {
        eprintln!("\nInterrupt received, cancelling...");
        cancel.cancel();
    }) {
        output::print_warning(&format!("Failed to set interrupt handler: {e}"));
    }

    let progress_mgr = ProgressManager::new(show_progress);
    let estimated_files = if show_progress {
        let spinner = progress_mgr.create_scanning_spinner();
        let estimate = estimate_tree(job.source());
        spinner.finish_and_clear();
        log::debug!(
            "Estimated {} directories, {} files, {} bytes",
            estimate.dirs,
            estimate.files,
            estimate.bytes
        );
        estimate.files
    } else {
        0
    };

    let bar = progress_mgr.create_copy_bar(estimated_files);
    let job = job.on_progress({
        let bar = bar.clone();
        move |snapshot| progress::update_copy_bar(&bar, snapshot)
    });

    let result = job.run();
    bar.finish_and_clear();
    progress_mgr.clear();
    let report = result?;

    if copy.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        output::print_report(&report);
        if report.is_clean() {
            println!();
            output::print_success();
        }
    }

    if copy.strict && !report.is_clean() {
        Ok(EXIT_FAILURES)
    } else {
        Ok(0)
    }
}

#[derive(Debug, Clone, Copy)]
enum ArchiveDirection {
    Compress,
    Decompress,
}

fn run_archive(
    archive: &ArchiveArgs,
    direction: ArchiveDirection,
) -> Result<i32, Box<dyn std::error::Error>> {
    let ignore_errors = !archive.fail_fast;
    let summary = match direction {
        ArchiveDirection::Compress => {
            tree_mirror_archive::compress(&archive.source, &archive.target, ignore_errors)?
        }
        ArchiveDirection::Decompress => {
            tree_mirror_archive::decompress(&archive.source, &archive.target, ignore_errors)?
        }
    };

    if archive.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        output::print_archive_summary(&summary);
    }

    Ok(0)
}

fn run_scan(scan: &ScanArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let entries = scan::scan_tree(&scan.path)?;

    if scan.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(0);
    }

    let mut dirs = 0_u64;
    let mut files = 0_u64;
    let mut errors = 0_u64;
    for entry in &entries {
        if let Some(reason) = &entry.error {
            errors += 1;
            output::print_scan_error(&entry.path, entry.depth, reason);
        } else {
            if entry.is_dir {
                dirs += 1;
            } else {
                files += 1;
            }
            output::print_scan_entry(&entry.path, entry.depth, entry.is_dir, entry.size);
        }
    }

    println!();
    println!("{dirs} directories, {files} files, {errors} unreadable");
    Ok(0)
}
