//! Build artifact housekeeping
//!
//! After `build_ext --inplace` the project root holds a `build/` directory
//! and the compiled modules, while each source has a `.c` file and maybe an
//! `.html` annotation next to it. Cleanup puts every artifact where it
//! belongs.

use super::types::{CleanOptions, CleanReport, Moved};
use crate::paths::{ProjectLayout, c_path_for, html_path_for, is_compiled_module, module_name};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Tidy up after a build of `sources`
///
/// - removes `build/` under the project root
/// - removes each source's `.c` file unless `keep_c_files`
/// - moves each `.html` annotation into the annotations directory
/// - moves compiled modules from the project root next to their source
///
/// Existing destinations are overwritten. Sources that do not exist are
/// skipped.
///
/// # Errors
///
/// Returns an error if a file or directory cannot be removed or moved.
pub fn clean(
    layout: &ProjectLayout,
    sources: &[PathBuf],
    options: CleanOptions,
) -> Result<CleanReport> {
    let mut report = CleanReport::default();

    fs::create_dir_all(&layout.annotations_dir).with_context(|| {
        format!(
            "Failed to create annotations directory: {}",
            layout.annotations_dir.display()
        )
    })?;

    if layout.build_dir.is_dir() {
        fs::remove_dir_all(&layout.build_dir).with_context(|| {
            format!("Failed to remove {}", layout.build_dir.display())
        })?;
        report.removed_build_dir = true;
    }

    let root_entries = compiled_candidates(&layout.root)?;

    for source in sources {
        if !source.is_file() {
            crate::debug!("{} not found; skipping", source.display());
            report.skipped.push(source.clone());
            continue;
        }

        if !options.keep_c_files {
            let c_file = c_path_for(source);
            if c_file.is_file() {
                fs::remove_file(&c_file)
                    .with_context(|| format!("Failed to remove {}", c_file.display()))?;
                report.removed_c_files.push(c_file);
            }
        }

        let html = html_path_for(source);
        if html.is_file() {
            let to = layout.annotation_destination(source);
            move_file(&html, &to)?;
            report.moved_annotations.push(Moved { from: html, to });
        }

        let (Some(module), Some(source_dir)) = (module_name(source), source.parent()) else {
            continue;
        };
        for from in root_entries
            .iter()
            .filter(|path| file_name(path).is_some_and(|name| is_compiled_module(name, module)))
        {
            let Some(name) = from.file_name() else {
                continue;
            };
            let to = source_dir.join(name);
            if *from == to || !from.is_file() {
                continue;
            }
            move_file(from, &to)?;
            report.moved_modules.push(Moved {
                from: from.clone(),
                to,
            });
        }
    }

    Ok(report)
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|name| name.to_str())
}

/// Files directly in the project root
fn compiled_candidates(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(root)
        .with_context(|| format!("Failed to read project directory: {}", root.display()))?
    {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Move a file, replacing the destination
fn move_file(from: &Path, to: &Path) -> Result<()> {
    crate::debug!("moving {} -> {}", from.display(), to.display());

    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }

    // rename fails across filesystems
    fs::copy(from, to).with_context(|| {
        format!("Failed to copy {} to {}", from.display(), to.display())
    })?;
    fs::remove_file(from).with_context(|| format!("Failed to remove {}", from.display()))?;
    Ok(())
}
