//! Configuration to acknowledge project conventions as well as set defaults.
//!
//! Specifically, we try to find an rsx.toml, and if present we load settings from there.
//! This provides the file extensions to scan, the component runtimes a template may embed, and
//! the names the validator looks for in the backend and UI-logic blocks.

use facet::Facet;
use std::fs;
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "rsx.toml";

#[derive(Facet, Clone, Debug, PartialEq)]
/// Project preferences loaded from rsx.toml or falling back to defaults.
pub struct Config {
    #[facet(default = vec!["rsx".to_string()])]
    /// File suffixes to match when scanning directories.
    pub file_extensions: Vec<String>,
    #[facet(default = vec!["react".to_string(), "vue".to_string(), "svelte".to_string()])]
    /// Runtimes an embedded component may delegate rendering to.
    pub supported_runtimes: Vec<String>,
    #[facet(default = "client".to_string())]
    /// Attribute that marks a capitalised tag as an embedded component.
    pub runtime_attribute: String,
    #[facet(default = "get_server_side_props".to_string())]
    /// Function every backend block is expected to define.
    pub entry_function: String,
    #[facet(default = "defineProps".to_string())]
    /// Marker the UI-logic block uses to declare its props.
    pub props_marker: String,
    #[facet(default = 10)]
    /// Upper bound on fixed-point passes of the directive preprocessor.
    pub max_preprocess_iterations: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file_extensions: vec!["rsx".to_string()],
            supported_runtimes: vec!["react".to_string(), "vue".to_string(), "svelte".to_string()],
            runtime_attribute: "client".to_string(),
            entry_function: "get_server_side_props".to_string(),
            props_marker: "defineProps".to_string(),
            max_preprocess_iterations: 10,
        }
    }
}

impl Config {
    #[must_use]
    /// Load configuration from rsx.toml if present.
    pub fn load() -> Self {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    #[must_use]
    /// Load configuration from `path`, using defaults when it is missing or malformed.
    pub fn load_from(path: &Path) -> Self {
        fs::read_to_string(path)
            .ok()
            .and_then(|contents| Self::from_toml(&contents))
            .unwrap_or_default()
    }

    #[must_use]
    /// Parse a TOML document; absent keys take their defaults.
    pub fn from_toml(contents: &str) -> Option<Self> {
        facet_toml::from_str::<Self>(contents).ok()
    }

    #[must_use]
    /// Whether `runtime` is one of the supported component runtimes.
    pub fn supports_runtime(&self, runtime: &str) -> bool {
        self.supported_runtimes.iter().any(|r| r == runtime)
    }
}

#[cfg(test)]
#[path = "tests/config.rs"]
mod tests;
