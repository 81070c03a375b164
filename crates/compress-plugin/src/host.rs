//! Host bundler interface
//!
//! The host owns the build: it resolves imports, loads files and emits
//! artifacts, and calls back into plugins at three extension points:
//! - **on-resolve**: map an import specifier to a path
//! - **on-load**: supply the contents of a path
//! - **on-end**: inspect or rewrite the emitted artifacts
//!
//! [`BuildHooks`] is an in-process host side of this contract. It records the
//! callbacks a plugin registers during setup and dispatches to them with the
//! usual matching rules, so a Rust host (or a test) can drive a plugin
//! directly.

use regex::Regex;
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::encoder::OutputLoader;
use crate::error::PluginError;

/// Namespace hosts assign to files on disk
pub const FILE_NAMESPACE: &str = "file";

/// Callback for on-resolve
pub type ResolveHandler =
    Arc<dyn Fn(&ResolveArgs) -> Result<Option<ResolveResult>, PluginError> + Send + Sync>;

/// Callback for on-load
pub type LoadHandler =
    Arc<dyn Fn(&LoadArgs) -> Result<Option<LoadResult>, PluginError> + Send + Sync>;

/// Callback for on-end
pub type EndHandler = Arc<dyn Fn(&mut BuildResult) -> Result<(), PluginError> + Send + Sync>;

/// Which specifiers an on-resolve callback is interested in
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    pub filter: Regex,
    pub namespace: Option<String>,
}

/// Which paths an on-load callback is interested in
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub filter: Regex,
    pub namespace: Option<String>,
}

/// An import being resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveArgs {
    /// Import specifier as written
    pub path: String,
    /// File containing the import
    pub importer: PathBuf,
    /// Namespace of the importer
    pub namespace: String,
}

/// Outcome of a successful resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveResult {
    /// Absolute path of the resolved module
    pub path: PathBuf,
}

/// A path being loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadArgs {
    pub path: PathBuf,
    pub namespace: String,
}

impl LoadArgs {
    /// Load a file from disk
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            namespace: FILE_NAMESPACE.to_string(),
        }
    }
}

/// Contents supplied for a loaded path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadResult {
    pub contents: String,
    pub loader: OutputLoader,
}

/// An emitted artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub path: PathBuf,
    pub contents: Vec<u8>,
    /// Hex SHA-256 of `contents`
    pub hash: String,
}

impl OutputFile {
    /// Create an artifact, hashing its contents
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        let contents = contents.into();
        let hash = content_hash(&contents);
        Self {
            path: path.into(),
            contents,
            hash,
        }
    }

    /// Contents decoded as UTF-8
    pub fn text(&self) -> Result<&str, PluginError> {
        std::str::from_utf8(&self.contents).map_err(|_| PluginError::InvalidUtf8(self.path.clone()))
    }

    /// Replace the contents and refresh the hash
    pub fn set_contents(&mut self, contents: impl Into<Vec<u8>>) {
        self.contents = contents.into();
        self.hash = content_hash(&self.contents);
    }
}

/// Result of a finished build, as seen by on-end callbacks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildResult {
    /// Emitted artifacts; `None` when the host did not keep them in memory
    pub output_files: Option<Vec<OutputFile>>,
}

impl BuildResult {
    pub fn new(output_files: Vec<OutputFile>) -> Self {
        Self {
            output_files: Some(output_files),
        }
    }
}

/// Registration side of the host contract
pub trait PluginBuild {
    fn on_resolve(&mut self, options: ResolveOptions, handler: ResolveHandler);
    fn on_load(&mut self, options: LoadOptions, handler: LoadHandler);
    fn on_end(&mut self, handler: EndHandler);
}

/// A bundler plugin
pub trait Plugin {
    /// Plugin name, for host diagnostics
    fn name(&self) -> &str;

    /// Register callbacks with the host
    ///
    /// Errors abort the build before any file is processed.
    fn setup(&self, build: &mut dyn PluginBuild) -> Result<(), PluginError>;
}

/// Recorded plugin callbacks with host-side dispatch
#[derive(Default)]
pub struct BuildHooks {
    resolvers: Vec<(ResolveOptions, ResolveHandler)>,
    loaders: Vec<(LoadOptions, LoadHandler)>,
    end: Vec<EndHandler>,
}

impl fmt::Debug for BuildHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildHooks")
            .field("resolvers", &self.resolvers.len())
            .field("loaders", &self.loaders.len())
            .field("end", &self.end.len())
            .finish()
    }
}

impl BuildHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a plugin's setup against a fresh set of hooks
    pub fn setup(plugin: &dyn Plugin) -> Result<Self, PluginError> {
        let mut hooks = Self::new();
        plugin.setup(&mut hooks)?;
        Ok(hooks)
    }

    /// Options of the registered on-load callbacks, in registration order
    pub fn load_options(&self) -> impl Iterator<Item = &LoadOptions> {
        self.loaders.iter().map(|(options, _)| options)
    }

    /// Options of the registered on-resolve callbacks, in registration order
    pub fn resolve_options(&self) -> impl Iterator<Item = &ResolveOptions> {
        self.resolvers.iter().map(|(options, _)| options)
    }

    /// Number of registered on-end callbacks
    pub fn end_hook_count(&self) -> usize {
        self.end.len()
    }

    /// Resolve an import through the first callback that claims it
    pub fn resolve(&self, args: &ResolveArgs) -> Result<Option<ResolveResult>, PluginError> {
        for (options, handler) in &self.resolvers {
            if !matches(&options.filter, options.namespace.as_deref(), &args.path, &args.namespace) {
                continue;
            }
            if let Some(result) = handler(args)? {
                return Ok(Some(result));
            }
        }
        Ok(None)
    }

    /// Load a path through the first callback that claims it
    pub fn load(&self, args: &LoadArgs) -> Result<Option<LoadResult>, PluginError> {
        let path = path_str(&args.path);
        for (options, handler) in &self.loaders {
            if !matches(&options.filter, options.namespace.as_deref(), &path, &args.namespace) {
                continue;
            }
            if let Some(result) = handler(args)? {
                return Ok(Some(result));
            }
        }
        Ok(None)
    }

    /// Run every on-end callback in registration order
    pub fn end(&self, result: &mut BuildResult) -> Result<(), PluginError> {
        for handler in &self.end {
            handler(result)?;
        }
        Ok(())
    }
}

impl PluginBuild for BuildHooks {
    fn on_resolve(&mut self, options: ResolveOptions, handler: ResolveHandler) {
        self.resolvers.push((options, handler));
    }

    fn on_load(&mut self, options: LoadOptions, handler: LoadHandler) {
        self.loaders.push((options, handler));
    }

    fn on_end(&mut self, handler: EndHandler) {
        self.end.push(handler);
    }
}

/// Path as the string filters are matched against
///
/// Separators are normalized to `/` so filters behave the same on every
/// platform.
pub fn path_str(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn matches(filter: &Regex, namespace: Option<&str>, path: &str, candidate_namespace: &str) -> bool {
    namespace.map_or(true, |ns| ns == candidate_namespace) && filter.is_match(path)
}

fn content_hash(contents: &[u8]) -> String {
    hex::encode(Sha256::digest(contents))
}
