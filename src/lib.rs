//! cythonbuilder internal library code
//!
//! Discovers Cython sources, compiles them into extension modules and writes
//! `.pyi` stub files that describe their Python-visible interface.

pub mod config;
pub mod debug;
pub mod discovery;
pub mod env_vars;
pub mod extensions;
pub mod paths;
pub mod stubgen;

#[cfg(test)]
pub mod test_utils;

// Re-export common types for convenience
pub use config::Config;
pub use debug::{init_debug, is_debug_enabled};
pub use discovery::{Discovery, DiscoveryError, find_sources};
pub use extensions::{
    BuildOptions, BuildResult, CleanOptions, CleanReport, CythonBuilder, clean,
};
pub use paths::ProjectLayout;
pub use stubgen::{StubError, generate_stub_beside, generate_stub_file, pyx_to_pyi, stub_path_for};
