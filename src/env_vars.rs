//! Environment variable handling.

use std::env;
use std::path::PathBuf;

// Helper for boolean environment variables that accept "1", "true", "yes"
fn is_enabled(var: &str) -> bool {
    env::var(var).ok().is_some_and(|s| parse_bool(&s))
}

fn parse_bool(value: &str) -> bool {
    let s = value.to_lowercase();
    s == "1" || s == "true" || s == "yes"
}

fn non_empty(var: &str) -> Option<String> {
    env::var(var).ok().filter(|s| !s.trim().is_empty())
}

/// Python interpreter used to run the Cython build (`PYTHON`).
pub fn python() -> Option<String> {
    non_empty("PYTHON")
}

/// C compiler passed through to setuptools (`CC`).
pub fn cc() -> Option<String> {
    non_empty("CC")
}

/// Extra compiler flags passed through to setuptools (`CFLAGS`).
pub fn cflags() -> Option<String> {
    non_empty("CFLAGS")
}

/// Extra linker flags passed through to setuptools (`LDFLAGS`).
pub fn ldflags() -> Option<String> {
    non_empty("LDFLAGS")
}

/// Compiler variables that are set, as `(name, value)` pairs.
pub fn compiler_overrides() -> Vec<(&'static str, String)> {
    [("CC", cc()), ("CFLAGS", cflags()), ("LDFLAGS", ldflags())]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .collect()
}

/// Whether debug output is requested through `CYBUILDER_DEBUG`.
pub fn debug() -> bool {
    is_enabled("CYBUILDER_DEBUG")
}

/// `XDG_CONFIG_HOME`, when set to something.
pub fn xdg_config_home() -> Option<PathBuf> {
    non_empty("XDG_CONFIG_HOME").map(PathBuf::from)
}

/// `PATH` entries in search order.
pub fn search_path() -> Vec<PathBuf> {
    env::var_os("PATH")
        .map(|path| env::split_paths(&path).collect())
        .unwrap_or_default()
}
