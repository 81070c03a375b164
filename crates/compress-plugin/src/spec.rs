//! Compressor specs
//!
//! A compressor spec says which candidates are compressed, how their content
//! is normalized, and at which point of the build it happens. Specs are
//! validated once during plugin setup and never change afterwards.

use regex::Regex;
use std::fmt;
use std::str::FromStr;

use crate::config::CompressorOptions;
use crate::error::PluginError;

/// How the raw content of a candidate is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Loader {
    /// Content is exported as a string
    Text,
    /// Content must be JSON and is exported as the parsed value
    Json,
}

impl Loader {
    /// Name used in configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            Loader::Text => "text",
            Loader::Json => "json",
        }
    }
}

impl FromStr for Loader {
    type Err = PluginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Loader::Text),
            "json" => Ok(Loader::Json),
            other => Err(PluginError::UnknownLoader(other.to_string())),
        }
    }
}

impl fmt::Display for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated compressor spec
#[derive(Debug, Clone)]
pub struct CompressorSpec {
    /// Pattern matched against the candidate path
    pub filter: Regex,
    /// Host namespace the candidate must belong to (any when `None`)
    pub namespace: Option<String>,
    /// Content normalization and generated module shape
    pub loader: Loader,
    /// Defer decompression until the default export is first awaited
    pub lazy: bool,
    /// Rewrite emitted artifacts instead of intercepting loads
    pub on_end: bool,
}

impl CompressorSpec {
    /// Create an eager load-time spec
    pub fn new(filter: Regex, loader: Loader) -> Self {
        Self {
            filter,
            namespace: None,
            loader,
            lazy: false,
            on_end: false,
        }
    }

    /// Restrict the spec to a host namespace
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Set whether the generated default export is lazy
    pub fn lazy(mut self, lazy: bool) -> Self {
        self.lazy = lazy;
        self
    }

    /// Set whether the spec applies to emitted artifacts
    pub fn on_end(mut self, on_end: bool) -> Self {
        self.on_end = on_end;
        self
    }

    /// Whether the filter matches a path
    pub fn matches(&self, path: &str) -> bool {
        self.filter.is_match(path)
    }
}

impl TryFrom<&CompressorOptions> for CompressorSpec {
    type Error = PluginError;

    fn try_from(options: &CompressorOptions) -> Result<Self, Self::Error> {
        let loader: Loader = options.loader.parse()?;
        let filter = Regex::new(&options.filter).map_err(|source| PluginError::InvalidFilter {
            filter: options.filter.clone(),
            source,
        })?;

        Ok(Self {
            filter,
            namespace: options.namespace.clone(),
            loader,
            lazy: options.lazy,
            on_end: options.on_end,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(filter: &str, loader: &str) -> CompressorOptions {
        CompressorOptions {
            filter: filter.to_string(),
            loader: loader.to_string(),
            namespace: None,
            lazy: false,
            on_end: false,
        }
    }

    #[test]
    fn test_loader_from_str() {
        assert_eq!("text".parse::<Loader>().unwrap(), Loader::Text);
        assert_eq!("json".parse::<Loader>().unwrap(), Loader::Json);
        assert!(matches!(
            "compressed-text".parse::<Loader>(),
            Err(PluginError::UnknownLoader(name)) if name == "compressed-text"
        ));
        assert!("Text".parse::<Loader>().is_err());
    }

    #[test]
    fn test_spec_from_options() {
        let mut raw = options(r"\.json$", "json");
        raw.namespace = Some("file".to_string());
        raw.lazy = true;

        let spec = CompressorSpec::try_from(&raw).unwrap();
        assert_eq!(spec.loader, Loader::Json);
        assert_eq!(spec.namespace.as_deref(), Some("file"));
        assert!(spec.lazy);
        assert!(!spec.on_end);
        assert!(spec.matches("data/big.json"));
        assert!(!spec.matches("data/big.json.map"));
    }

    #[test]
    fn test_spec_rejects_bad_loader() {
        let result = CompressorSpec::try_from(&options(".", "bad-loader"));
        assert!(matches!(result, Err(PluginError::UnknownLoader(_))));
    }

    #[test]
    fn test_spec_rejects_bad_filter() {
        let result = CompressorSpec::try_from(&options("(unclosed", "text"));
        assert!(matches!(result, Err(PluginError::InvalidFilter { .. })));
    }

    #[test]
    fn test_builder() {
        let spec = CompressorSpec::new(Regex::new(r"\.txt$").unwrap(), Loader::Text)
            .namespace("file")
            .lazy(true)
            .on_end(true);
        assert_eq!(spec.namespace.as_deref(), Some("file"));
        assert!(spec.lazy);
        assert!(spec.on_end);
    }
}
