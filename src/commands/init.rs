//! Init command
//!
//! Create the extensions and annotations directories

use super::Workspace;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Create the project directories; running it again is harmless
pub(crate) fn run(workspace: &Workspace) -> Result<()> {
    let layout = &workspace.layout;

    if has_entries(&layout.extensions_dir)? {
        eprintln!(
            "warning: {} already contains files",
            workspace.display_path(&layout.extensions_dir)
        );
    }

    for dir in [&layout.extensions_dir, &layout.annotations_dir] {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    println!("Initialized cybuilder in {}", layout.root.display());
    println!("  extensions:  {}", workspace.display_path(&layout.extensions_dir));
    println!("  annotations: {}", workspace.display_path(&layout.annotations_dir));
    Ok(())
}

fn has_entries(dir: &Path) -> Result<bool> {
    if !dir.is_dir() {
        return Ok(false);
    }
    let mut entries =
        fs::read_dir(dir).with_context(|| format!("Failed to read directory {}", dir.display()))?;
    Ok(entries.next().is_some())
}
