//! Native extension building
//!
//! Compiles `.pyx` sources with Cython and setuptools, then tidies the
//! by-products. It's the equivalent of:
//! ```bash
//! python setup.py build_ext --inplace   # compile in the project root
//! rm -r build ext/*.c                   # drop intermediates
//! mv ext/*.html ext/annotations/        # collect annotations
//! mv *.so ext/                          # modules next to their sources
//! ```

pub mod builder;
pub mod cleanup;
pub mod types;

pub use builder::{CythonBuilder, ExtensionSpec, setup_script};
pub use cleanup::clean;
pub use types::{BuildOptions, BuildResult, CleanOptions, CleanReport, Moved};
