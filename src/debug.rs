//! Debug logging utilities
//!
//! Debug output is enabled once per process, from the global `--debug` flag
//! or the `CYBUILDER_DEBUG` environment variable. When it is off, the
//! `debug!` macro costs one atomic load.

use std::sync::OnceLock;

static DEBUG_ENABLED: OnceLock<bool> = OnceLock::new();

/// Initialize debug mode from the command-line flag and environment
pub fn init_debug(flag: bool) {
    let _ = DEBUG_ENABLED.set(flag || crate::env_vars::debug());
}

/// Check if debug mode is enabled
pub fn is_debug_enabled() -> bool {
    DEBUG_ENABLED.get().copied().unwrap_or(false)
}

/// Print a debug message if debug mode is enabled
///
/// The [`debug!`](crate::debug!) macro checks the flag before formatting
/// and then lands here.
pub fn debug_log(message: &str) {
    if is_debug_enabled() {
        eprintln!("[DEBUG] {message}");
    }
}

/// Macro for convenient debug logging
///
/// Usage: `debug!("message with {}", variable)`
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        if $crate::debug::is_debug_enabled() {
            $crate::debug::debug_log(&format!($($arg)*));
        }
    };
}
