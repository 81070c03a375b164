//! Plugin options
//!
//! Options can be built in code or parsed from a TOML file:
//!
//! ```toml
//! namespace = "compress"
//! install-root = "/opt/compress-plugin"
//!
//! [runtime-modules]
//! lz-string = "/opt/compress-plugin/node_modules/lz-string/libs/lz-string.js"
//!
//! [[compressors]]
//! filter = "\\.txt$"
//! loader = "text"
//! lazy = true
//! ```
//!
//! Compressor entries keep the strings the user wrote. Loader kinds and
//! filters are validated when the plugin is set up.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::spec::Loader;

/// Default prefix of virtual runtime imports
pub const DEFAULT_NAMESPACE: &str = "compress";

/// Host loader name claiming an extension as compressed text
pub const COMPRESSED_TEXT_LOADER: &str = "compressed-text";

/// Host loader name claiming an extension as compressed JSON
pub const COMPRESSED_JSON_LOADER: &str = "compressed-json";

/// Errors that can occur while reading plugin options
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the options file
    #[error("Failed to read plugin options: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse plugin options: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Validation error
    #[error("Invalid plugin options: {0}")]
    ValidationError(String),
}

/// Top-level plugin options
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct PluginOptions {
    /// Prefix of the virtual runtime imports in generated modules
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Directory the runtime helper packages are installed under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_root: Option<PathBuf>,

    /// Explicit locations of runtime helper modules, by package name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub runtime_modules: BTreeMap<String, PathBuf>,

    /// Compressor entries, in registration order
    #[serde(default)]
    pub compressors: Vec<CompressorOptions>,
}

/// A compressor entry as written in configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct CompressorOptions {
    /// Regular expression matched against candidate paths
    pub filter: String,

    /// Loader kind: `text` or `json`
    pub loader: String,

    /// Host namespace restriction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Defer decompression to first access
    #[serde(default)]
    pub lazy: bool,

    /// Rewrite emitted artifacts instead of intercepting loads
    #[serde(default)]
    pub on_end: bool,
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

impl Default for PluginOptions {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            install_root: None,
            runtime_modules: BTreeMap::new(),
            compressors: Vec::new(),
        }
    }
}

impl CompressorOptions {
    /// Create an eager load-time entry
    pub fn new(filter: impl Into<String>, loader: impl Into<String>) -> Self {
        Self {
            filter: filter.into(),
            loader: loader.into(),
            namespace: None,
            lazy: false,
            on_end: false,
        }
    }
}

impl PluginOptions {
    /// Parse options from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse options from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let options: PluginOptions = toml::from_str(content)?;
        options.validate()?;
        Ok(options)
    }

    /// Validate the options that can be checked without a build
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.namespace.is_empty() {
            return Err(ConfigError::ValidationError(
                "Namespace cannot be empty".to_string(),
            ));
        }

        if !is_valid_namespace(&self.namespace) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid namespace: {}. Must contain only alphanumeric characters, hyphens and underscores",
                self.namespace
            )));
        }

        for name in self.runtime_modules.keys() {
            if name.is_empty() {
                return Err(ConfigError::ValidationError(
                    "Runtime module name cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Add a compressor entry
    pub fn compressor(mut self, compressor: CompressorOptions) -> Self {
        self.compressors.push(compressor);
        self
    }

    /// Add compressors for a host loader map
    ///
    /// Entries mapping an extension (e.g. `.txt`) to `compressed-text` or
    /// `compressed-json` become compressors whose filter matches paths ending
    /// in that extension. Other entries are left to the host.
    pub fn with_loader_map(mut self, loaders: &BTreeMap<String, String>, lazy: bool) -> Self {
        for (ext, name) in loaders {
            let Some(loader) = compressed_loader(name) else {
                continue;
            };
            self.compressors.push(CompressorOptions {
                filter: format!("{}$", regex::escape(ext)),
                loader: loader.as_str().to_string(),
                namespace: None,
                lazy,
                on_end: false,
            });
        }
        self
    }
}

/// Map a host loader name to the compressor loader it stands for
pub fn compressed_loader(name: &str) -> Option<Loader> {
    match name {
        COMPRESSED_TEXT_LOADER => Some(Loader::Text),
        COMPRESSED_JSON_LOADER => Some(Loader::Json),
        _ => None,
    }
}

/// Extensions of a loader map that the plugin takes over
///
/// The host should load these with its `empty` loader so the original file
/// body never reaches the bundle.
pub fn claimed_extensions(loaders: &BTreeMap<String, String>) -> Vec<&str> {
    loaders
        .iter()
        .filter(|(_, name)| compressed_loader(name).is_some())
        .map(|(ext, _)| ext.as_str())
        .collect()
}

fn is_valid_namespace(namespace: &str) -> bool {
    namespace
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
