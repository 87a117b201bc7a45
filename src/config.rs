//! Configuration file management
//!
//! Reads cybuilder's TOML configuration from an explicit path, the project
//! directory, or the user's config directory.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Project-local configuration file name
pub const LOCAL_CONFIG_FILE: &str = ".cybuilder.toml";

/// Default directory holding the extension sources
pub const DEFAULT_EXTENSIONS_DIR: &str = "ext";

/// Default annotations directory, relative to the extensions directory
pub const DEFAULT_ANNOTATIONS_DIR: &str = "annotations";

/// Application configuration loaded from TOML files
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Directory created by `init` for extension sources
    pub extensions_dir: String,

    /// Where Cython HTML annotations are collected, relative to `extensions_dir`
    pub annotations_dir: String,

    /// Always add the numpy include directory to builds
    pub include_numpy: bool,

    /// Python interpreter override
    pub python: Option<String>,

    /// Extra directory names skipped while discovering sources
    pub exclude: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extensions_dir: DEFAULT_EXTENSIONS_DIR.to_string(),
            annotations_dir: DEFAULT_ANNOTATIONS_DIR.to_string(),
            include_numpy: false,
            python: None,
            exclude: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration for the current directory.
    /// Priority: ./.cybuilder.toml -> user config -> defaults
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        Self::load_with_options(None, false)
    }

    /// Load configuration with custom options.
    ///
    /// # Arguments
    /// * `custom_path` - Optional custom path to config file (overrides defaults)
    /// * `skip_rc` - If true, skip loading config files (return default config)
    ///
    /// # Errors
    ///
    /// Returns an error if the custom file is missing or any config file that
    /// exists fails to parse.
    pub fn load_with_options(custom_path: Option<&Path>, skip_rc: bool) -> Result<Self> {
        Self::load_in(Path::new("."), custom_path, skip_rc)
    }

    /// Same as [`Config::load_with_options`] with the project directory given
    ///
    /// # Errors
    ///
    /// See [`Config::load_with_options`].
    pub fn load_in(project_dir: &Path, custom_path: Option<&Path>, skip_rc: bool) -> Result<Self> {
        if skip_rc {
            crate::debug!("--norc given, using default configuration");
            return Ok(Self::default());
        }

        if let Some(path) = custom_path {
            return Self::load_from(path);
        }

        let candidates = std::iter::once(project_dir.join(LOCAL_CONFIG_FILE))
            .chain(Self::user_config_dir().map(|dir| dir.join("config.toml")));
        for path in candidates {
            if path.is_file() {
                return Self::load_from(&path);
            }
        }

        Ok(Self::default())
    }

    /// Parse one configuration file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML for
    /// this schema.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        crate::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    fn user_config_dir() -> Option<PathBuf> {
        if let Some(xdg_config) = crate::env_vars::xdg_config_home() {
            return Some(xdg_config.join("cybuilder"));
        }

        dirs::home_dir().map(|home| home.join(".config").join("cybuilder"))
    }
}
