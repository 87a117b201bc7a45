//! Interface command
//!
//! Write a `.pyi` stub next to every discovered `.pyx` source

use super::Workspace;
use anyhow::Result;
use cythonbuilder::{StubError, generate_stub_beside};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Discover sources, confirm, then generate their stubs
pub(crate) fn run(workspace: &Workspace, files: &[String], accept: bool) -> Result<()> {
    let sources = workspace.discover(files)?;
    if sources.is_empty() {
        println!("No pyx files found");
        return Ok(());
    }
    println!("Found {} pyx file(s) to generate interfaces for", sources.len());

    if !workspace.confirm_sources("generate interfaces for", &sources, accept)? {
        return Ok(());
    }

    generate_all(&sources)?;
    println!("Generated {} interface file(s)", sources.len());
    Ok(())
}

/// Generate stubs for `sources` in parallel
///
/// Every source is attempted. The first failure (in source order) is
/// returned after all files have been processed.
pub(crate) fn generate_all(sources: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let pb = ProgressBar::new(sources.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let results: Vec<Result<PathBuf, StubError>> = sources
        .par_iter()
        .map(|source| {
            let result = generate_one(source);
            pb.inc(1);
            result
        })
        .collect();
    pb.finish_and_clear();

    let mut stubs = Vec::with_capacity(results.len());
    let mut first_error = None;
    for result in results {
        match result {
            Ok(stub) => stubs.push(stub),
            Err(err) => {
                eprintln!("error: {err}");
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }
    }

    match first_error {
        Some(err) => Err(err.into()),
        None => Ok(stubs),
    }
}

fn generate_one(source: &Path) -> Result<PathBuf, StubError> {
    cythonbuilder::debug!("generating stub for {}", source.display());
    generate_stub_beside(source)
}
