//! `.pyx` to `.pyi` stub generation
//!
//! A stub keeps the public shape of a Cython module (imports, classes, class
//! attributes and function signatures) and drops every function body. Native
//! C types in signatures are mapped to the Python types callers see.
//!
//! The pipeline for one file is:
//!
//! 1. [`indent::source_lines`] strips comments and blank lines
//! 2. [`indent::Indentation::analyze`] validates indentation for the whole file
//! 3. [`classify::scan`] folds scope state over the lines
//! 4. [`translate::translate`] rewrites the lines that survive
//!
//! Nothing is written until all four steps succeed.

pub mod classify;
pub mod indent;
pub mod translate;
pub mod types;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use indent::{Indentation, source_lines};

/// Extension of Cython source files
pub const SOURCE_EXTENSION: &str = "pyx";

/// Extension of generated stub files
pub const STUB_EXTENSION: &str = "pyi";

/// Errors raised while generating a stub
#[derive(Debug, Error)]
pub enum StubError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Inconsistent indentation on line {line}: {found} spaces is not a multiple of the {unit}-space indentation unit"
    )]
    InconsistentIndentation {
        line: usize,
        found: usize,
        unit: usize,
    },

    #[error("Tab indentation on line {line}; indent with spaces")]
    TabIndentation { line: usize },

    #[error("Signature on line {line} spans several lines, which is not supported: {text}")]
    UnterminatedSignature { line: usize, text: String },

    #[error("{path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: Box<StubError>,
    },
}

impl StubError {
    /// Attach the file being processed to a content error
    fn in_file(self, path: &Path) -> Self {
        match self {
            Self::Read { .. } | Self::Write { .. } | Self::File { .. } => self,
            other => Self::File {
                path: path.to_path_buf(),
                source: Box::new(other),
            },
        }
    }
}

/// Translate `.pyx` content into stub lines
///
/// # Errors
///
/// Returns an error if the file's indentation is inconsistent or a function
/// header spans several lines.
pub fn pyx_to_pyi(content: &str) -> Result<Vec<String>, StubError> {
    let lines = source_lines(content);
    let indentation = Indentation::analyze(&lines)?;
    crate::debug!(
        "{} source lines, indentation unit {:?}",
        lines.len(),
        indentation.unit()
    );
    translate::translate(&lines, indentation)
}

/// Render stub lines as newline-terminated file content
#[must_use]
pub fn render(stub: &[String]) -> String {
    stub.iter().fold(String::new(), |mut out, line| {
        out.push_str(line);
        out.push('\n');
        out
    })
}

/// Generate the stub for `src` and write it to `dst`
///
/// The destination is written through a temporary file in the same directory
/// and renamed into place, so a failed run leaves any previous stub intact.
///
/// # Errors
///
/// Returns an error if `src` cannot be read as UTF-8, its content cannot be
/// translated, or `dst` cannot be written.
pub fn generate_stub_file(src: &Path, dst: &Path) -> Result<(), StubError> {
    let content = fs::read_to_string(src).map_err(|source| StubError::Read {
        path: src.to_path_buf(),
        source,
    })?;

    let stub = pyx_to_pyi(&content).map_err(|err| err.in_file(src))?;
    write_atomically(dst, &render(&stub))?;

    crate::debug!("wrote {} ({} lines)", dst.display(), stub.len());
    Ok(())
}

/// Generate the stub next to `src`, returning the stub path
///
/// # Errors
///
/// See [`generate_stub_file`].
pub fn generate_stub_beside(src: &Path) -> Result<PathBuf, StubError> {
    let dst = stub_path_for(src);
    generate_stub_file(src, &dst)?;
    Ok(dst)
}

/// `foo/bar.pyx` -> `foo/bar.pyi`
#[must_use]
pub fn stub_path_for(src: &Path) -> PathBuf {
    src.with_extension(STUB_EXTENSION)
}

fn write_atomically(dst: &Path, content: &str) -> Result<(), StubError> {
    let wrap = |source| StubError::Write {
        path: dst.to_path_buf(),
        source,
    };

    let dir = dst
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(wrap)?;
    temp.write_all(content.as_bytes()).map_err(wrap)?;
    temp.persist(dst).map_err(|err| wrap(err.error))?;

    Ok(())
}
