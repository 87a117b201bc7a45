//! List command
//!
//! Show the `.pyx` sources that build, clean and interface would act on

use super::Workspace;
use anyhow::Result;

/// List discovered sources, optionally as a JSON array of paths
pub(crate) fn run(workspace: &Workspace, files: &[String], json: bool) -> Result<()> {
    let sources = workspace.discover(files)?;

    if json {
        let paths: Vec<String> = sources
            .iter()
            .map(|source| source.to_string_lossy().into_owned())
            .collect();
        println!("{}", serde_json::to_string_pretty(&paths)?);
        return Ok(());
    }

    if files.is_empty() {
        println!("Listing all pyx files...");
    } else {
        println!("Listing pyx files (filtered by {})...", files.join(" "));
    }

    if sources.is_empty() {
        println!("No pyx files found");
    } else {
        println!("Found files:");
        workspace.print_sources(&sources);
    }

    Ok(())
}
