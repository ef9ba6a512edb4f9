//! Terminal output formatting.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::Path;

use colored::Colorize;
use indicatif::{HumanBytes, HumanDuration};
use tree_mirror_archive::ArchiveSummary;
use tree_mirror_copy::{FailureRecord, ReplicationReport};

/// Print a header message.
pub fn print_header(message: &str) {
    println!("\n{} {}\n", "🌳", message.bold());
}

/// Print the source and target of a run.
pub fn print_paths(source: &Path, target: &Path) {
    println!("Source: {}", source.display().to_string().cyan());
    println!("Target: {}", target.display().to_string().cyan());
    println!();
}

/// Print the summary of a finished run, followed by its failures.
pub fn print_report(report: &ReplicationReport) {
    println!(
        "{} {}",
        if report.is_clean() {
            "✓".green()
        } else {
            "!".yellow()
        },
        summary_line(report)
    );
    println!(
        "  {}",
        format!(
            "parallelism {}, peak {} in flight",
            report.parallelism, report.peak_in_flight
        )
        .dimmed()
    );

    if !report.failures.is_empty() {
        println!();
        print_failures(&report.failures);
    }
}

/// One-line totals of a finished run.
#[must_use]
pub fn summary_line(report: &ReplicationReport) -> String {
    format!(
        "{} directories, {}/{} files, {} in {}",
        report.dirs_created,
        report.files_copied,
        report.files_enqueued,
        HumanBytes(report.bytes_copied),
        HumanDuration(report.elapsed)
    )
}

/// Print recorded failures.
pub fn print_failures(failures: &[FailureRecord]) {
    println!(
        "{} {} entr{} failed:",
        "Warning:".yellow().bold(),
        failures.len(),
        if failures.len() == 1 { "y" } else { "ies" }
    );
    for failure in failures {
        println!(
            "  {} {} {}",
            "•".dimmed(),
            failure.path.display().to_string().yellow(),
            failure.reason.dimmed()
        );
    }
}

/// Print the totals of a compress or decompress run, followed by skipped entries.
pub fn print_archive_summary(summary: &ArchiveSummary) {
    println!(
        "{} {}",
        if summary.is_clean() {
            "✓".green()
        } else {
            "!".yellow()
        },
        archive_summary_line(summary)
    );
    println!("  {}", summary.archive.display().to_string().dimmed());

    if !summary.is_clean() {
        println!();
        println!(
            "{} {} entr{} skipped:",
            "Warning:".yellow().bold(),
            summary.skipped.len(),
            if summary.skipped.len() == 1 { "y" } else { "ies" }
        );
        for skipped in &summary.skipped {
            println!(
                "  {} {} {}",
                "•".dimmed(),
                skipped.path.display().to_string().yellow(),
                skipped.reason.dimmed()
            );
        }
    }
}

/// One-line totals of an archive run.
#[must_use]
pub fn archive_summary_line(summary: &ArchiveSummary) -> String {
    format!(
        "{} directories, {} files, {}",
        summary.dirs,
        summary.files,
        HumanBytes(summary.bytes)
    )
}

/// Print one scanned entry, indented by depth.
pub fn print_scan_entry(relative: &Path, depth: usize, is_dir: bool, size: u64) {
    let indent = "  ".repeat(depth);
    let name = if depth == 0 {
        ".".to_string()
    } else {
        relative.display().to_string()
    };
    if is_dir {
        println!("{indent}{}/", name.blue().bold());
    } else {
        println!("{indent}{name} {}", HumanBytes(size).to_string().dimmed());
    }
}

/// Print an entry the walker could not read.
pub fn print_scan_error(relative: &Path, depth: usize, reason: &str) {
    let indent = "  ".repeat(depth);
    println!(
        "{indent}{} {}",
        relative.display().to_string().red(),
        reason.dimmed()
    );
}

/// Print success message.
pub fn print_success() {
    println!("{} Tree mirrored!", "✅");
}

/// Print error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", "Error:".red().bold(), message);
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    println!("{} {}", "Warning:".yellow().bold(), message);
}
