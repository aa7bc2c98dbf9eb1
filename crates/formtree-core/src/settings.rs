//! Settings for the formtree toolkit.
//!
//! The toolkit itself is a library and needs very little configuration;
//! [`Settings`] covers the logging surface (debug formatting and level)
//! and can be loaded from the environment for host applications that do
//! not want to construct it in code.

use serde::{Deserialize, Serialize};

/// Toolkit-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Whether to use the human-readable log format (vs. structured JSON).
    pub debug: bool,
    /// Explicit tracing filter directive (e.g. `"info"`,
    /// `"formtree_forms=debug"`). When unset, the level is derived from
    /// `debug`.
    pub log_level: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            log_level: None,
        }
    }
}

impl Settings {
    /// Loads settings from the environment.
    ///
    /// Reads `FORMTREE_DEBUG` (`"1"`, `"true"`, `"yes"` enable debug mode)
    /// and `FORMTREE_LOG_LEVEL` (empty counts as unset). Missing variables
    /// fall back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let debug = std::env::var("FORMTREE_DEBUG").map_or(defaults.debug, |v| {
            matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on")
        });
        let log_level = std::env::var("FORMTREE_LOG_LEVEL")
            .ok()
            .filter(|v| !v.is_empty());
        Self { debug, log_level }
    }
}
