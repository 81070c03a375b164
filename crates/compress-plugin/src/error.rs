//! Plugin error types.

use std::path::PathBuf;

use crate::config::ConfigError;
use crate::resolver::ResolveError;

/// Errors surfaced to the host from setup or from a hook invocation.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// A compressor names a loader kind other than `text` or `json`
    #[error("Unknown compressor loader: {0}")]
    UnknownLoader(String),

    /// A compressor filter is not a valid regular expression
    #[error("Invalid compressor filter {filter:?}: {source}")]
    InvalidFilter {
        filter: String,
        #[source]
        source: regex::Error,
    },

    /// Reading a candidate file failed
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Content under a `json` compressor is not valid JSON
    #[error("Invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A source file or emitted artifact is not UTF-8 text
    #[error("File is not valid UTF-8: {}", .0.display())]
    InvalidUtf8(PathBuf),

    /// A virtual import could not be resolved
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Plugin options are invalid
    #[error(transparent)]
    Config(#[from] ConfigError),
}
