//! Clean command
//!
//! Remove build intermediates and move artifacts where they belong

use super::Workspace;
use anyhow::Result;
use cythonbuilder::{CleanOptions, CleanReport, clean};
use std::path::PathBuf;

/// Discover sources, confirm, then clean up after their build
pub(crate) fn run(
    workspace: &Workspace,
    files: &[String],
    keep_c_files: bool,
    accept: bool,
) -> Result<()> {
    let sources = workspace.discover(files)?;
    if sources.is_empty() {
        println!("No pyx files found");
        return Ok(());
    }
    println!("Found {} pyx file(s) to clean", sources.len());

    if !workspace.confirm_sources("clean", &sources, accept)? {
        return Ok(());
    }

    println!("Cleaning {} pyx file(s)...", sources.len());
    let report = clean_sources(workspace, &sources, keep_c_files)?;
    print_report(workspace, &report);
    println!("Cleanup complete");
    Ok(())
}

/// Run cleanup for `sources`; shared with `build`
pub(crate) fn clean_sources(
    workspace: &Workspace,
    sources: &[PathBuf],
    keep_c_files: bool,
) -> Result<CleanReport> {
    clean(&workspace.layout, sources, CleanOptions { keep_c_files })
}

pub(crate) fn print_report(workspace: &Workspace, report: &CleanReport) {
    if report.is_empty() {
        println!("Nothing to clean");
        return;
    }

    if report.removed_build_dir {
        println!("  Removed {}", workspace.display_path(&workspace.layout.build_dir));
    }
    for c_file in &report.removed_c_files {
        println!("  Removed {}", workspace.display_path(c_file));
    }
    for moved in report.moved_annotations.iter().chain(&report.moved_modules) {
        println!(
            "  Moved {} -> {}",
            workspace.display_path(&moved.from),
            workspace.display_path(&moved.to)
        );
    }
}
