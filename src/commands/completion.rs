//! Completion command
//!
//! Generate shell completion scripts

use anyhow::Result;
use clap::CommandFactory;
use clap_complete::{Shell, generate};
use std::io::{self, Write};

const BIN_NAME: &str = "cybuilder";

/// Print the completion script for `shell` to stdout
///
/// ```bash
/// cybuilder completion bash > /usr/local/share/bash-completion/completions/cybuilder
/// cybuilder completion zsh > /usr/local/share/zsh/site-functions/_cybuilder
/// cybuilder completion fish > ~/.config/fish/completions/cybuilder.fish
/// ```
pub(crate) fn run(shell: Shell) -> Result<()> {
    let mut stdout = io::stdout().lock();
    write_script(shell, &mut stdout);
    stdout.flush()?;
    Ok(())
}

fn write_script(shell: Shell, out: &mut dyn Write) {
    let mut cmd = crate::Cli::command();
    generate(shell, &mut cmd, BIN_NAME, out);
}
