//! Build and cleanup option and result types

use std::path::PathBuf;
use std::time::Duration;

/// How sources are compiled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Let Cython write an HTML annotation next to each source
    pub annotate: bool,
    /// Add numpy's include directory to every extension
    pub include_numpy: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            annotate: true,
            include_numpy: false,
        }
    }
}

/// Result of compiling a set of sources
#[derive(Debug)]
pub struct BuildResult {
    /// Module names handed to setuptools
    pub modules: Vec<String>,

    /// Sources that no longer existed and were left out
    pub skipped: Vec<PathBuf>,

    /// Whether the build succeeded
    pub success: bool,

    /// Build duration
    pub duration: Duration,

    /// Error message if failed
    pub error: Option<String>,

    /// Build output (stdout + stderr)
    pub output: String,
}

impl BuildResult {
    /// Create a successful build result
    #[must_use]
    pub const fn success(
        modules: Vec<String>,
        skipped: Vec<PathBuf>,
        duration: Duration,
        output: String,
    ) -> Self {
        Self {
            modules,
            skipped,
            success: true,
            duration,
            error: None,
            output,
        }
    }

    /// Create a failed build result
    #[must_use]
    pub const fn failure(
        modules: Vec<String>,
        skipped: Vec<PathBuf>,
        duration: Duration,
        error: String,
        output: String,
    ) -> Self {
        Self {
            modules,
            skipped,
            success: false,
            duration,
            error: Some(error),
            output,
        }
    }
}

/// What cleanup keeps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanOptions {
    /// Leave the generated `.c` files in place
    pub keep_c_files: bool,
}

/// A file moved during cleanup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Moved {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Everything cleanup did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    /// setuptools' `build/` directory was removed
    pub removed_build_dir: bool,
    /// Generated C files that were deleted
    pub removed_c_files: Vec<PathBuf>,
    /// Annotations moved into the annotations directory
    pub moved_annotations: Vec<Moved>,
    /// Compiled modules moved next to their source
    pub moved_modules: Vec<Moved>,
    /// Sources that did not exist
    pub skipped: Vec<PathBuf>,
}

impl CleanReport {
    /// Whether cleanup touched anything at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.removed_build_dir
            && self.removed_c_files.is_empty()
            && self.moved_annotations.is_empty()
            && self.moved_modules.is_empty()
    }
}
