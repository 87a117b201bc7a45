//! Build command
//!
//! Compile sources, tidy the artifacts and write stubs

use super::{Workspace, clean, confirm, interface};
use anyhow::{Context, Result};
use cythonbuilder::{BuildOptions, CythonBuilder};

/// Build options as given on the command line
#[derive(Debug, Clone, Copy)]
pub(crate) struct BuildArgs {
    pub(crate) include_numpy: bool,
    pub(crate) no_annotation: bool,
    pub(crate) no_interface: bool,
    pub(crate) no_cleanup: bool,
    pub(crate) accept: bool,
    pub(crate) verbose: bool,
}

/// Discover, confirm, compile, clean up and generate interfaces
pub(crate) fn run(workspace: &Workspace, files: &[String], args: BuildArgs) -> Result<()> {
    let builder = CythonBuilder::new(workspace.config.python.as_deref(), args.verbose)?;
    let include_numpy = resolve_numpy(&builder, args, workspace.config.include_numpy)?;

    let sources = workspace.discover(files)?;
    if sources.is_empty() {
        println!("No pyx files found");
        return Ok(());
    }
    println!("Found {} pyx file(s) to build", sources.len());

    if !workspace.confirm_sources("build", &sources, args.accept)? {
        return Ok(());
    }

    println!("Building {} pyx file(s)...", sources.len());
    let options = BuildOptions {
        annotate: !args.no_annotation,
        include_numpy,
    };
    let result = builder.build(&workspace.layout.root, &sources, options)?;

    if !result.success {
        if !args.verbose {
            eprint!("{}", result.output);
        }
        anyhow::bail!(
            "Build failed: {}",
            result.error.as_deref().unwrap_or("unknown error")
        );
    }
    println!(
        "Built {} module(s) in {:.1}s, cleaning up...",
        result.modules.len(),
        result.duration.as_secs_f64()
    );

    let report = clean::clean_sources(workspace, &sources, args.no_cleanup)
        .context("Cleanup after build failed")?;
    clean::print_report(workspace, &report);

    if !args.no_interface {
        let built: Vec<_> = sources
            .into_iter()
            .filter(|source| !result.skipped.contains(source))
            .collect();
        interface::generate_all(&built).context("Generating interface files failed")?;
        println!("Generated {} interface file(s)", built.len());
    }

    println!("Cython build success");
    Ok(())
}

/// Decide whether numpy goes on the include path
///
/// Requested numpy must be installed. Unrequested but installed numpy is
/// offered interactively, unless `--accept` is set.
fn resolve_numpy(builder: &CythonBuilder, args: BuildArgs, from_config: bool) -> Result<bool> {
    let requested = args.include_numpy || from_config;

    if requested {
        if !builder.numpy_available() {
            anyhow::bail!(
                "numpy is requested but not installed for {}. Please install numpy and try again",
                builder.python_path().display()
            );
        }
        return Ok(true);
    }

    if args.accept || !builder.numpy_available() {
        return Ok(false);
    }

    confirm("Your project has numpy installed. Include numpy in the Cython build?")
}
