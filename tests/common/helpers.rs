//! Shared test helpers and utilities

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Path to the compiled cybuilder binary
pub(crate) fn get_cybuilder_binary() -> &'static str {
    env!("CARGO_BIN_EXE_cybuilder")
}

/// A `cybuilder` command running in `project`
///
/// The user config directory is pointed into the project so a developer's
/// own configuration never leaks into a test run.
pub(crate) fn cybuilder(project: &Path) -> Command {
    let mut cmd = Command::new(get_cybuilder_binary());
    cmd.current_dir(project)
        .env("XDG_CONFIG_HOME", project.join(".xdg"))
        .env_remove("CYBUILDER_DEBUG")
        .env_remove("PYTHON");
    cmd
}

/// Run `cybuilder args...` in `project`
pub(crate) fn run(project: &Path, args: &[&str]) -> Output {
    cybuilder(project)
        .args(args)
        .output()
        .expect("Failed to execute cybuilder")
}

/// Write a file below `root`, creating parent directories
pub(crate) fn write(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    fs::write(&path, content).expect("Failed to write file");
    path
}

/// A temporary project with the given `(relative path, content)` files
pub(crate) fn create_project(files: &[(&str, &str)]) -> TempDir {
    let temp = TempDir::new().expect("Failed to create temp dir");
    for (relative, content) in files {
        write(temp.path(), relative, content);
    }
    temp
}

pub(crate) fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub(crate) fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}
