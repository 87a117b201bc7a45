//! Integration tests for the cybuilder command-line interface

mod common;

use common::cybuilder;
use common::helpers::{create_project, run, stderr, stdout, write};
use std::fs;
use std::process::Stdio;

const FUNCTION_PYX: &str = "\
cimport cython

cpdef int add(int a, int b=2):
    return a + b
";

const FUNCTION_PYI: &str = "\
import cython
def add(a:int, b:int=2) -> int:
    ...
";

#[test]
fn test_help_lists_subcommands() {
    let temp = create_project(&[]);
    let output = run(temp.path(), &["--help"]);

    assert!(output.status.success());
    let out = stdout(&output);
    for subcommand in ["init", "list", "build", "clean", "interface", "completion"] {
        assert!(out.contains(subcommand), "help is missing {subcommand}");
    }
}

#[test]
fn test_version() {
    let temp = create_project(&[]);
    let output = run(temp.path(), &["--version"]);

    assert!(output.status.success());
    assert!(stdout(&output).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_unknown_subcommand_fails() {
    let temp = create_project(&[]);
    let output = run(temp.path(), &["frobnicate"]);

    assert!(!output.status.success());
}

#[test]
fn test_init_creates_directories() {
    let temp = create_project(&[]);
    let output = run(temp.path(), &["init"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(temp.path().join("ext").is_dir());
    assert!(temp.path().join("ext/annotations").is_dir());

    // Second run only warns once the directory has content
    let again = run(temp.path(), &["init"]);
    assert!(again.status.success());
    assert!(stderr(&again).contains("already contains files"));
}

#[test]
fn test_init_honours_local_config() {
    let temp = create_project(&[(
        ".cybuilder.toml",
        "extensions_dir = \"native\"\nannotations_dir = \"html\"\n",
    )]);
    let output = run(temp.path(), &["init"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(temp.path().join("native/html").is_dir());
    assert!(!temp.path().join("ext").exists());
}

#[test]
fn test_norc_ignores_local_config() {
    let temp = create_project(&[(".cybuilder.toml", "extensions_dir = \"native\"\n")]);
    let output = run(temp.path(), &["--norc", "init"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(temp.path().join("ext/annotations").is_dir());
    assert!(!temp.path().join("native").exists());
}

#[test]
fn test_invalid_config_is_reported() {
    let temp = create_project(&[(".cybuilder.toml", "extensions_dir = [")]);
    let output = run(temp.path(), &["list"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).starts_with("error:"));
}

#[test]
fn test_list_all_sources() {
    let temp = create_project(&[
        ("ext/alpha.pyx", FUNCTION_PYX),
        ("ext/sub/beta.pyx", FUNCTION_PYX),
        ("ext/notes.txt", "not a source"),
        ("build/gamma.pyx", FUNCTION_PYX),
        (".venv/pyvenv.cfg", ""),
        (".venv/lib/delta.pyx", FUNCTION_PYX),
    ]);
    let output = run(temp.path(), &["list"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Found files:"));
    assert!(out.contains("alpha.pyx"));
    assert!(out.contains("beta.pyx"));
    assert!(!out.contains("notes.txt"));
    assert!(!out.contains("gamma.pyx"));
    assert!(!out.contains("delta.pyx"));
}

#[test]
fn test_list_json() {
    let temp = create_project(&[("ext/alpha.pyx", FUNCTION_PYX), ("ext/beta.pyx", "")]);
    let output = run(temp.path(), &["list", "--json"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let paths: Vec<String> = serde_json::from_str(&stdout(&output)).expect("valid JSON");
    assert_eq!(paths.len(), 2);
    assert!(paths[0].ends_with("alpha.pyx"));
    assert!(paths[1].ends_with("beta.pyx"));
}

#[test]
fn test_list_filtered_with_missing_name() {
    let temp = create_project(&[("ext/alpha.pyx", FUNCTION_PYX), ("ext/beta.pyx", "")]);
    let output = run(temp.path(), &["list", "--files", "alpha.pyx", "ghost"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("alpha.pyx"));
    assert!(!out.contains("beta.pyx"));
    assert!(stderr(&output).contains("cannot find provided target files: ghost"));
}

#[test]
fn test_list_empty_project() {
    let temp = create_project(&[]);
    let output = run(temp.path(), &["list"]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("No pyx files found"));
}

#[test]
fn test_interface_writes_stub() {
    let temp = create_project(&[("ext/adder.pyx", FUNCTION_PYX)]);
    let output = run(temp.path(), &["interface", "-y"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let stub = fs::read_to_string(temp.path().join("ext/adder.pyi")).expect("stub written");
    assert_eq!(stub, FUNCTION_PYI);
    assert!(stdout(&output).contains("Generated 1 interface file(s)"));
}

#[test]
fn test_interface_only_for_named_files() {
    let temp = create_project(&[("ext/one.pyx", FUNCTION_PYX), ("ext/two.pyx", FUNCTION_PYX)]);
    let output = run(temp.path(), &["interface", "--files", "two", "-y"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(temp.path().join("ext/two.pyi").is_file());
    assert!(!temp.path().join("ext/one.pyi").exists());
}

#[test]
fn test_interface_cancelled_without_confirmation() {
    let temp = create_project(&[("ext/adder.pyx", FUNCTION_PYX)]);
    let output = cybuilder(temp.path())
        .arg("interface")
        .stdin(Stdio::null())
        .output()
        .expect("Failed to execute cybuilder");

    assert!(output.status.success());
    assert!(stdout(&output).contains("Cancelled."));
    assert!(!temp.path().join("ext/adder.pyi").exists());
}

#[test]
fn test_interface_bad_indentation_fails() {
    let temp = create_project(&[(
        "ext/broken.pyx",
        "cpdef int ok(int a):\n    return a\n\ncdef class Broken:\n      x = 1\n",
    )]);
    let output = run(temp.path(), &["interface", "-y"]);

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("error:"));
    assert!(err.contains("broken.pyx"));
    assert!(err.contains("Inconsistent indentation"));
    assert!(!temp.path().join("ext/broken.pyi").exists());
}

#[test]
fn test_clean_moves_artifacts() {
    let temp = create_project(&[
        ("ext/fast.pyx", FUNCTION_PYX),
        ("ext/fast.c", "/* generated */"),
        ("ext/fast.html", "<html></html>"),
        ("fast.cpython-312-x86_64-linux-gnu.so", "binary"),
        ("build/temp/fast.o", "object"),
    ]);
    let output = run(temp.path(), &["clean", "-y"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let root = temp.path();
    assert!(!root.join("build").exists());
    assert!(!root.join("ext/fast.c").exists());
    assert!(!root.join("ext/fast.html").exists());
    assert!(root.join("ext/annotations/fast.html").is_file());
    assert!(!root.join("fast.cpython-312-x86_64-linux-gnu.so").exists());
    assert!(root.join("ext/fast.cpython-312-x86_64-linux-gnu.so").is_file());
    assert!(stdout(&output).contains("Cleanup complete"));
}

#[test]
fn test_clean_keeps_c_files_when_asked() {
    let temp = create_project(&[("ext/fast.pyx", FUNCTION_PYX), ("ext/fast.c", "/* generated */")]);
    let output = run(temp.path(), &["clean", "--no-cleanup", "-y"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(temp.path().join("ext/fast.c").is_file());
}

#[test]
fn test_clean_twice_is_harmless() {
    let temp = create_project(&[("ext/fast.pyx", FUNCTION_PYX), ("ext/fast.c", "")]);

    assert!(run(temp.path(), &["clean", "-y"]).status.success());
    let second = run(temp.path(), &["clean", "-y"]);
    assert!(second.status.success(), "stderr: {}", stderr(&second));
    assert!(stdout(&second).contains("Nothing to clean"));
}

#[test]
fn test_build_with_missing_interpreter_fails() {
    let temp = create_project(&[("ext/adder.pyx", FUNCTION_PYX)]);
    let output = cybuilder(temp.path())
        .args(["build", "-y"])
        .env("PYTHON", temp.path().join("no-such-python"))
        .output()
        .expect("Failed to execute cybuilder");

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).starts_with("error:"));
    assert!(!temp.path().join("ext/adder.pyi").exists());
}

#[test]
fn test_completion_bash() {
    let temp = create_project(&[]);
    let output = run(temp.path(), &["completion", "bash"]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("cybuilder"));
}

#[test]
fn test_debug_flag_logs_to_stderr() {
    let temp = create_project(&[("ext/adder.pyx", FUNCTION_PYX)]);
    write(temp.path(), "ext/other.pyx", FUNCTION_PYX);
    let output = run(temp.path(), &["--debug", "interface", "-y"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("generating stub"));
}
