//! Project layout and sibling path derivation.
//!
//! Cython writes its by-products next to each source (`foo.c`, `foo.html`)
//! and drops the compiled module (`foo.cpython-312-x86_64-linux-gnu.so`,
//! `foo.cp312-win_amd64.pyd`) in the directory the build ran in.

use crate::config::Config;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Directory setuptools uses for intermediate objects
pub const BUILD_DIR: &str = "build";

/// Extensions of compiled Python extension modules
pub const COMPILED_MODULE_EXTENSIONS: &[&str] = &["so", "pyd"];

/// Directories of one cybuilder project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    /// Project root; builds run here
    pub root: PathBuf,
    /// Directory created for extension sources
    pub extensions_dir: PathBuf,
    /// Where HTML annotations are collected
    pub annotations_dir: PathBuf,
    /// setuptools' temporary build directory
    pub build_dir: PathBuf,
}

impl ProjectLayout {
    /// Resolve the layout of the project rooted at `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, config: &Config) -> Self {
        let root = root.into();
        let extensions_dir = root.join(&config.extensions_dir);
        let annotations_dir = extensions_dir.join(&config.annotations_dir);
        let build_dir = root.join(BUILD_DIR);

        Self {
            root,
            extensions_dir,
            annotations_dir,
            build_dir,
        }
    }

    /// Where the annotation of `source` ends up after cleanup
    #[must_use]
    pub fn annotation_destination(&self, source: &Path) -> PathBuf {
        let html = html_path_for(source);
        html.file_name()
            .map_or_else(|| html.clone(), |name| self.annotations_dir.join(name))
    }
}

/// File stem of a source (`pkg/fast.pyx` -> `fast`)
#[must_use]
pub fn module_name(source: &Path) -> Option<&str> {
    source.file_stem().and_then(OsStr::to_str)
}

/// Generated C file next to a source
#[must_use]
pub fn c_path_for(source: &Path) -> PathBuf {
    source.with_extension("c")
}

/// Cython HTML annotation next to a source
#[must_use]
pub fn html_path_for(source: &Path) -> PathBuf {
    source.with_extension("html")
}

/// Whether `file_name` is a compiled module built from `module`
///
/// Matches `module.so`, `module.pyd` and their ABI-tagged forms such as
/// `module.cpython-312-darwin.so`.
#[must_use]
pub fn is_compiled_module(file_name: &str, module: &str) -> bool {
    let Some(rest) = file_name.strip_prefix(module) else {
        return false;
    };
    if !rest.starts_with('.') {
        return false;
    }

    rest.rsplit('.')
        .next()
        .is_some_and(|ext| COMPILED_MODULE_EXTENSIONS.contains(&ext))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Tests can panic")]
mod tests {
    use super::*;

    #[test]
    fn layout_from_default_config() {
        let layout = ProjectLayout::new("/proj", &Config::default());
        assert_eq!(layout.extensions_dir, PathBuf::from("/proj/ext"));
        assert_eq!(layout.annotations_dir, PathBuf::from("/proj/ext/annotations"));
        assert_eq!(layout.build_dir, PathBuf::from("/proj/build"));
    }

    #[test]
    fn layout_follows_config() {
        let config = Config {
            extensions_dir: "cython".to_string(),
            annotations_dir: "html".to_string(),
            ..Config::default()
        };
        let layout = ProjectLayout::new("/proj", &config);
        assert_eq!(layout.annotations_dir, PathBuf::from("/proj/cython/html"));
    }

    #[test]
    fn sibling_paths() {
        let source = Path::new("/proj/ext/pkg/fast.pyx");
        assert_eq!(module_name(source), Some("fast"));
        assert_eq!(c_path_for(source), PathBuf::from("/proj/ext/pkg/fast.c"));
        assert_eq!(html_path_for(source), PathBuf::from("/proj/ext/pkg/fast.html"));

        let layout = ProjectLayout::new("/proj", &Config::default());
        assert_eq!(
            layout.annotation_destination(source),
            PathBuf::from("/proj/ext/annotations/fast.html")
        );
    }

    #[test]
    fn compiled_module_names() {
        assert!(is_compiled_module("fast.so", "fast"));
        assert!(is_compiled_module("fast.cpython-312-x86_64-linux-gnu.so", "fast"));
        assert!(is_compiled_module("fast.cp312-win_amd64.pyd", "fast"));
        assert!(!is_compiled_module("faster.cpython-312-x86_64-linux-gnu.so", "fast"));
        assert!(!is_compiled_module("fast.c", "fast"));
        assert!(!is_compiled_module("fast.pyx", "fast"));
        assert!(!is_compiled_module("breakfast.so", "fast"));
    }
}
