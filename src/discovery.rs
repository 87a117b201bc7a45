//! Source discovery
//!
//! Finds the `.pyx` files of a project. Virtual environments (any directory
//! holding a `pyvenv.cfg`), hidden directories, setuptools' `build/`
//! directory and configured exclusions are never descended into.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

use crate::paths::BUILD_DIR;
use crate::stubgen::SOURCE_EXTENSION;

/// Marker file of a Python virtual environment
const VENV_MARKER: &str = "pyvenv.cfg";

/// Errors that can occur while discovering sources
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Project root {path} is not a directory")]
    RootNotFound { path: PathBuf },

    #[error("Failed to read project root {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Result of a discovery run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    /// Matching sources, sorted by path
    pub sources: Vec<PathBuf>,
    /// Filter names that matched no source, as given
    pub missing: Vec<String>,
}

/// Find `.pyx` sources under `root`
///
/// `filter` holds file names with or without the `.pyx` extension; `None` or
/// an empty filter selects every source. `exclude` lists extra directory
/// names to skip.
///
/// # Errors
///
/// Returns an error if `root` is not a readable directory.
pub fn find_sources(
    root: &Path,
    filter: Option<&[String]>,
    exclude: &[String],
) -> Result<Discovery, DiscoveryError> {
    if !root.is_dir() {
        return Err(DiscoveryError::RootNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut sources = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_skipped_dir(entry, exclude));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => {
                return Err(DiscoveryError::Walk {
                    path: root.to_path_buf(),
                    source: err,
                });
            }
            Err(err) => {
                crate::debug!("skipping unreadable entry: {err}");
                continue;
            }
        };

        if entry.file_type().is_file()
            && entry.path().extension().is_some_and(|ext| ext == SOURCE_EXTENSION)
        {
            sources.push(entry.into_path());
        }
    }
    sources.sort();

    let discovery = match filter.filter(|names| !names.is_empty()) {
        Some(names) => apply_filter(sources, names),
        None => Discovery {
            sources,
            missing: Vec::new(),
        },
    };

    crate::debug!(
        "discovered {} source(s) under {}",
        discovery.sources.len(),
        root.display()
    );
    Ok(discovery)
}

/// Module name a filter entry refers to (`pkg/fast.pyx` and `fast` -> `fast`)
#[must_use]
pub fn filter_key(name: &str) -> &str {
    let file_name = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(name);
    file_name
        .strip_suffix(".pyx")
        .unwrap_or(file_name)
}

fn apply_filter(sources: Vec<PathBuf>, names: &[String]) -> Discovery {
    let wanted: BTreeSet<&str> = names.iter().map(|name| filter_key(name)).collect();

    let sources: Vec<PathBuf> = sources
        .into_iter()
        .filter(|source| crate::paths::module_name(source).is_some_and(|stem| wanted.contains(stem)))
        .collect();

    let found: BTreeSet<&str> = sources
        .iter()
        .filter_map(|source| crate::paths::module_name(source))
        .collect();
    let missing = names
        .iter()
        .filter(|name| !found.contains(filter_key(name)))
        .cloned()
        .collect();

    Discovery { sources, missing }
}

fn is_skipped_dir(entry: &DirEntry, exclude: &[String]) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }

    let name = entry.file_name().to_string_lossy();
    if name.starts_with('.') || exclude.iter().any(|ex| *ex == name) {
        return true;
    }
    if entry.depth() == 1 && name == BUILD_DIR {
        return true;
    }
    if entry.path().join(VENV_MARKER).is_file() {
        crate::debug!("skipping virtual environment {}", entry.path().display());
        return true;
    }

    false
}
