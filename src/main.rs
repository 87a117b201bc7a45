//! cybuilder command-line interface
//!
//! Build Cython extensions and generate `.pyi` interface files for them

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use commands::Workspace;
use commands::build::BuildArgs;

/// Display an error with optional backtrace information
///
/// Backtraces are only available when `RUST_BACKTRACE` is set.
fn display_error(err: &anyhow::Error, backtrace_enabled: bool) {
    eprintln!("error: {err}");

    // Show error chain
    let mut source = err.source();
    while let Some(err) = source {
        eprintln!("caused by: {err}");
        source = err.source();
    }

    if backtrace_enabled {
        let backtrace = err.backtrace();
        if backtrace.status() == std::backtrace::BacktraceStatus::Captured {
            eprintln!("\nBacktrace:");
            eprintln!("{backtrace}");
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "cybuilder")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build Cython extensions and generate .pyi interface files", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    /// Print debug output
    #[arg(long, global = true)]
    debug: bool,

    /// Show a backtrace for errors (requires `RUST_BACKTRACE=1`)
    #[arg(long, global = true)]
    backtrace: bool,

    /// Use this configuration file instead of the default locations
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Do not read any configuration file
    #[arg(long, global = true, conflicts_with = "config")]
    norc: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Initialize cybuilder (create the extension directories)
    Init,

    /// List all .pyx files
    List {
        /// Only these files (names with or without .pyx)
        #[arg(long, num_args = 1..)]
        files: Vec<String>,

        /// Print a JSON array of paths
        #[arg(long)]
        json: bool,
    },

    /// Compile .pyx files, clean up and generate .pyi files
    Build {
        /// Only these files (names with or without .pyx)
        #[arg(long, num_args = 1..)]
        files: Vec<String>,

        /// Add numpy's include directory to the build
        #[arg(long)]
        include_numpy: bool,

        /// Skip generating HTML annotations
        #[arg(long)]
        no_annotation: bool,

        /// Skip generating .pyi stub files
        #[arg(long)]
        no_interface: bool,

        /// Keep the generated C files
        #[arg(long)]
        no_cleanup: bool,

        /// Do not ask for confirmation
        #[arg(short = 'y', long)]
        accept: bool,

        /// Show compiler commands and output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Remove build intermediates and move artifacts next to their sources
    Clean {
        /// Only these files (names with or without .pyx)
        #[arg(long, num_args = 1..)]
        files: Vec<String>,

        /// Keep the generated C files
        #[arg(long)]
        no_cleanup: bool,

        /// Do not ask for confirmation
        #[arg(short = 'y', long)]
        accept: bool,
    },

    /// Generate .pyi interface files
    Interface {
        /// Only these files (names with or without .pyx)
        #[arg(long, num_args = 1..)]
        files: Vec<String>,

        /// Do not ask for confirmation
        #[arg(short = 'y', long)]
        accept: bool,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn main() {
    let cli = Cli::parse();
    let GlobalArgs {
        debug,
        backtrace,
        config,
        norc,
    } = cli.global;

    cythonbuilder::init_debug(debug);

    let result = match cli.command {
        Commands::Completion { shell } => commands::completion::run(shell),
        command => Workspace::load(config.as_deref(), norc)
            .and_then(|workspace| dispatch(&workspace, command)),
    };

    if let Err(e) = result {
        display_error(&e, backtrace);
        process::exit(1);
    }
}

fn dispatch(workspace: &Workspace, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Init => commands::init::run(workspace),
        Commands::List { files, json } => commands::list::run(workspace, &files, json),
        Commands::Build {
            files,
            include_numpy,
            no_annotation,
            no_interface,
            no_cleanup,
            accept,
            verbose,
        } => commands::build::run(
            workspace,
            &files,
            BuildArgs {
                include_numpy,
                no_annotation,
                no_interface,
                no_cleanup,
                accept,
                verbose,
            },
        ),
        Commands::Clean {
            files,
            no_cleanup,
            accept,
        } => commands::clean::run(workspace, &files, no_cleanup, accept),
        Commands::Interface { files, accept } => {
            commands::interface::run(workspace, &files, accept)
        }
        Commands::Completion { shell } => commands::completion::run(shell),
    }
}

mod commands;
