//! Subcommand implementations
//!
//! Every command resolves the project from the current directory, discovers
//! its sources and asks before touching files unless `--accept` was given.

pub(crate) mod build;
pub(crate) mod clean;
pub(crate) mod completion;
pub(crate) mod init;
pub(crate) mod interface;
pub(crate) mod list;

use anyhow::{Context, Result};
use cythonbuilder::{Config, ProjectLayout, find_sources};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// Configuration and layout of the project in the current directory
#[derive(Debug, Clone)]
pub(crate) struct Workspace {
    pub(crate) config: Config,
    pub(crate) layout: ProjectLayout,
}

impl Workspace {
    /// Load configuration and resolve the layout for the current directory
    pub(crate) fn load(config_path: Option<&Path>, norc: bool) -> Result<Self> {
        let root = std::env::current_dir().context("Failed to determine current directory")?;
        let config = Config::load_in(&root, config_path, norc)?;
        let layout = ProjectLayout::new(root, &config);
        Ok(Self { config, layout })
    }

    /// Discover sources, warning about filter names that matched nothing
    pub(crate) fn discover(&self, files: &[String]) -> Result<Vec<PathBuf>> {
        let discovery = find_sources(&self.layout.root, Some(files), &self.config.exclude)?;

        if !discovery.missing.is_empty() {
            eprintln!(
                "warning: cannot find provided target files: {}",
                discovery.missing.join(", ")
            );
        }

        Ok(discovery.sources)
    }

    /// Source path as shown to the user, relative to the project root
    pub(crate) fn display_path<'a>(&self, path: &'a Path) -> std::path::Display<'a> {
        path.strip_prefix(&self.layout.root)
            .unwrap_or(path)
            .display()
    }

    /// One `  - path` line per source
    pub(crate) fn print_sources(&self, sources: &[PathBuf]) {
        for source in sources {
            println!("  - {}", self.display_path(source));
        }
    }

    /// Ask to proceed with `action` on `sources`
    pub(crate) fn confirm_sources(
        &self,
        action: &str,
        sources: &[PathBuf],
        accept: bool,
    ) -> Result<bool> {
        if accept {
            return Ok(true);
        }

        println!("About to {action} {} pyx file(s):", sources.len());
        self.print_sources(sources);
        confirm("Continue?")
    }
}

/// Ask a yes/no question on stdin; anything but `y`/`yes` is no
pub(crate) fn confirm(question: &str) -> Result<bool> {
    print!("{question} [y/N] ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    let accepted = is_yes(&input);
    if !accepted {
        println!("Cancelled.");
    }
    Ok(accepted)
}

fn is_yes(answer: &str) -> bool {
    let answer = answer.trim().to_lowercase();
    answer == "y" || answer == "yes"
}
