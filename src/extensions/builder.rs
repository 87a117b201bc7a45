//! Cython compilation
//!
//! Builds extension modules the way a hand-written `setup.py` would:
//! every source becomes a setuptools `Extension` named after its file stem,
//! the list goes through `cythonize`, and the script runs with
//! `build_ext --inplace` from the project root.
//!
//! ```bash
//! python setup.py build_ext --inplace
//! ```

use super::types::{BuildOptions, BuildResult};
use crate::paths::module_name;
use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::Instant;

/// Interpreter names tried on `PATH`, in order
const PYTHON_CANDIDATES: &[&str] = &["python3", "python"];

/// Name of the generated setuptools script
const SETUP_SCRIPT: &str = "cybuilder_setup.py";

/// Prints numpy's include directory
const NUMPY_INCLUDE_PROBE: &str = "import numpy; print(numpy.get_include())";

/// Cython builder
///
/// Owns the interpreter that runs setuptools and Cython.
#[derive(Debug)]
pub struct CythonBuilder {
    /// Path to the Python interpreter
    python_path: PathBuf,
    /// Echo commands and build output
    verbose: bool,
}

impl CythonBuilder {
    /// Create a new builder
    ///
    /// Finds the interpreter in this order:
    /// 1. `python_override` (a path, or a name looked up on `PATH`)
    /// 2. `PYTHON` environment variable
    /// 3. `python3`, then `python`, on `PATH`
    ///
    /// # Errors
    ///
    /// Returns an error if no interpreter can be found.
    pub fn new(python_override: Option<&str>, verbose: bool) -> Result<Self> {
        let python_path = Self::find_python_executable(python_override)
            .context("Python interpreter not found. Building extensions requires Python with Cython and setuptools.")?;
        crate::debug!("using python at {}", python_path.display());

        Ok(Self {
            python_path,
            verbose,
        })
    }

    /// Interpreter this builder runs
    #[must_use]
    pub fn python_path(&self) -> &Path {
        &self.python_path
    }

    fn find_python_executable(python_override: Option<&str>) -> Result<PathBuf> {
        let requested = python_override
            .map(str::to_string)
            .or_else(crate::env_vars::python);

        if let Some(requested) = requested {
            return resolve_executable(&requested).with_context(|| {
                format!("Requested interpreter '{requested}' does not exist")
            });
        }

        PYTHON_CANDIDATES
            .iter()
            .find_map(|name| find_in_path(name))
            .ok_or_else(|| anyhow::anyhow!("Neither python3 nor python found in PATH"))
    }

    /// numpy's C header directory, as reported by the interpreter
    ///
    /// # Errors
    ///
    /// Returns an error if numpy cannot be imported.
    pub fn numpy_include_dir(&self) -> Result<PathBuf> {
        let output = Command::new(&self.python_path)
            .args(["-c", NUMPY_INCLUDE_PROBE])
            .output()
            .context("Failed to run the Python interpreter")?;

        if !output.status.success() {
            anyhow::bail!("numpy is not installed for {}", self.python_path.display());
        }

        let dir = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if dir.is_empty() {
            anyhow::bail!("numpy reported an empty include directory");
        }
        Ok(PathBuf::from(dir))
    }

    /// Whether numpy is importable
    #[must_use]
    pub fn numpy_available(&self) -> bool {
        self.numpy_include_dir().is_ok()
    }

    /// Compile `sources` into extension modules inside `root`
    ///
    /// Sources that no longer exist are skipped with a notice. Failures of the
    /// compiler run itself are reported through the returned [`BuildResult`].
    ///
    /// # Errors
    ///
    /// Returns an error if no source is left to build, numpy was requested
    /// but is missing, or the setup script cannot be written.
    pub fn build(
        &self,
        root: &Path,
        sources: &[PathBuf],
        options: BuildOptions,
    ) -> Result<BuildResult> {
        let start_time = Instant::now();

        let (present, skipped): (Vec<&PathBuf>, Vec<&PathBuf>) =
            sources.iter().partition(|source| source.is_file());
        for source in &skipped {
            println!("File '{}' not found; skipping", source.display());
        }
        if present.is_empty() {
            anyhow::bail!("No sources to build");
        }
        let skipped: Vec<PathBuf> = skipped.into_iter().cloned().collect();

        let include_dirs = if options.include_numpy {
            vec![
                self.numpy_include_dir()
                    .context("numpy is required (--include-numpy) but could not be found")?,
            ]
        } else {
            Vec::new()
        };

        let extensions = present
            .iter()
            .map(|source| {
                let name = module_name(source).with_context(|| {
                    format!("Source {} has no usable module name", source.display())
                })?;
                Ok(ExtensionSpec {
                    name: name.to_string(),
                    source: absolute(root, source),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let modules: Vec<String> = extensions.iter().map(|ext| ext.name.clone()).collect();

        let script = setup_script(&extensions, &include_dirs, options.annotate)?;
        let script_dir = tempfile::Builder::new()
            .prefix("cybuilder-")
            .tempdir()
            .context("Failed to create a directory for the setup script")?;
        let script_path = script_dir.path().join(SETUP_SCRIPT);
        fs::write(&script_path, script)
            .with_context(|| format!("Failed to write {}", script_path.display()))?;

        if self.verbose {
            println!("Building {} extension(s) in {}", modules.len(), root.display());
            println!(
                "  Running: {} {} build_ext --inplace",
                self.python_path.display(),
                script_path.display()
            );
        }

        let mut cmd = Command::new(&self.python_path);
        cmd.arg(&script_path)
            .args(["build_ext", "--inplace"])
            .current_dir(root);
        for (name, value) in crate::env_vars::compiler_overrides() {
            crate::debug!("passing {name}={value} to the build");
            cmd.env(name, value);
        }

        let result = match cmd.output() {
            Ok(out) => self.finish(modules, skipped, start_time, &out),
            Err(e) => BuildResult::failure(
                modules,
                skipped,
                start_time.elapsed(),
                format!("Failed to run {}: {e}", self.python_path.display()),
                String::new(),
            ),
        };

        Ok(result)
    }

    fn finish(
        &self,
        modules: Vec<String>,
        skipped: Vec<PathBuf>,
        start_time: Instant,
        out: &Output,
    ) -> BuildResult {
        let mut output = String::from_utf8_lossy(&out.stdout).into_owned();
        output.push_str(&String::from_utf8_lossy(&out.stderr));

        if self.verbose {
            print!("{output}");
        }

        if out.status.success() {
            BuildResult::success(modules, skipped, start_time.elapsed(), output)
        } else {
            BuildResult::failure(
                modules,
                skipped,
                start_time.elapsed(),
                format!(
                    "build_ext failed with exit code: {}",
                    out.status
                        .code()
                        .map_or_else(|| "unknown".to_string(), |c| c.to_string())
                ),
                output,
            )
        }
    }
}

/// One `Extension(...)` entry of the setup script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionSpec {
    pub name: String,
    pub source: PathBuf,
}

/// Render the setuptools script that cythonizes `extensions`
///
/// Strings are emitted as JSON literals, which Python reads as the same
/// string literals.
///
/// # Errors
///
/// Returns an error if a path cannot be encoded.
pub fn setup_script(
    extensions: &[ExtensionSpec],
    include_dirs: &[PathBuf],
    annotate: bool,
) -> Result<String> {
    let annotate = if annotate { "True" } else { "False" };
    let include_dirs = include_dirs
        .iter()
        .map(|dir| py_str(&dir.to_string_lossy()))
        .collect::<Result<Vec<_>>>()?
        .join(", ");

    let mut script = String::new();
    writeln!(script, "from setuptools import setup, Extension")?;
    writeln!(script, "from Cython.Build import cythonize")?;
    writeln!(script, "import Cython.Compiler.Options")?;
    writeln!(script)?;
    writeln!(script, "Cython.Compiler.Options.annotate = {annotate}")?;
    writeln!(script, "include_dirs = [{include_dirs}]")?;
    writeln!(script)?;
    writeln!(script, "ext_modules = [")?;
    for ext in extensions {
        writeln!(
            script,
            "    Extension(name={}, sources=[{}], include_dirs=include_dirs),",
            py_str(&ext.name)?,
            py_str(&ext.source.to_string_lossy())?
        )?;
    }
    writeln!(script, "]")?;
    writeln!(script)?;
    writeln!(
        script,
        "setup(ext_modules=cythonize(ext_modules, annotate={annotate}))"
    )?;

    Ok(script)
}

fn py_str(value: &str) -> Result<String> {
    serde_json::to_string(value).context("Failed to encode string for the setup script")
}

fn absolute(root: &Path, source: &Path) -> PathBuf {
    if source.is_absolute() {
        source.to_path_buf()
    } else {
        root.join(source)
    }
}

/// Resolve an interpreter given as a path or a bare name
fn resolve_executable(requested: &str) -> Option<PathBuf> {
    let path = Path::new(requested);
    if path.components().count() > 1 {
        return path.is_file().then(|| path.to_path_buf());
    }
    find_in_path(requested).or_else(|| path.is_file().then(|| path.to_path_buf()))
}

/// First file called `name` on `PATH`
fn find_in_path(name: &str) -> Option<PathBuf> {
    crate::env_vars::search_path().into_iter().find_map(|dir| {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
        let exe = candidate.with_extension("exe");
        exe.is_file().then_some(exe)
    })
}
