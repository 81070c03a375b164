//! Virtual module resolution
//!
//! Generated modules import their runtime helpers through virtual specifiers
//! such as `compress:lz-string`. The consuming program usually does not
//! depend on those helpers itself, so the specifiers are resolved against an
//! indirection table owned by the plugin and against the plugin's own install
//! location, never relative to the importing file.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during virtual module resolution
#[derive(Debug, Error, Clone)]
pub enum ResolveError {
    /// Specifier does not carry the virtual namespace prefix
    #[error("Not a virtual import: {0}")]
    NotVirtual(String),

    /// No installed package or table entry for the specifier
    #[error("Cannot resolve virtual import {specifier} (tried: {tried:?})")]
    ModuleNotFound { specifier: String, tried: Vec<PathBuf> },

    /// A package manifest could not be read
    #[error("Invalid package.json at {}: {message}", path.display())]
    InvalidPackageJson { path: PathBuf, message: String },

    /// IO error during resolution
    #[error("IO error: {0}")]
    IoError(String),
}

/// Fields of `package.json` used to find a package entry point
#[derive(Debug, Default, Deserialize)]
struct PackageJson {
    #[serde(default)]
    module: Option<String>,
    #[serde(default)]
    main: Option<String>,
}

/// Resolver for `<namespace>:<package>` specifiers
#[derive(Debug, Clone)]
pub struct VirtualModuleResolver {
    /// Namespace prefix, without the colon
    namespace: String,
    /// Explicit package name → file mappings
    modules: HashMap<String, PathBuf>,
    /// Directory the package search starts from
    install_root: Option<PathBuf>,
}

impl VirtualModuleResolver {
    /// Create a resolver for a namespace with an empty table
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            modules: HashMap::new(),
            install_root: None,
        }
    }

    /// Search `node_modules` directories from `root` upwards
    pub fn with_install_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.install_root = Some(root.into());
        self
    }

    /// Map a package name to a file, bypassing the package search
    pub fn with_module(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.modules.insert(name.into(), path.into());
        self
    }

    /// Directory the package search starts from, if any
    pub fn install_root(&self) -> Option<&Path> {
        self.install_root.as_deref()
    }

    /// The namespace prefix
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Regex source matching every virtual specifier of this namespace
    pub fn filter(&self) -> String {
        format!("^{}:", regex::escape(&self.namespace))
    }

    /// Check if a specifier is a virtual import of this namespace
    pub fn is_virtual(&self, specifier: &str) -> bool {
        self.module_name(specifier).is_some()
    }

    /// Extract the package name from a virtual specifier
    pub fn module_name<'a>(&self, specifier: &'a str) -> Option<&'a str> {
        specifier
            .strip_prefix(self.namespace.as_str())?
            .strip_prefix(':')
            .filter(|name| !name.is_empty())
    }

    /// Resolve a virtual specifier to an absolute file path
    ///
    /// # Resolution Order
    /// 1. Explicit table entry for the package name
    /// 2. `node_modules/<name>` in the install root, then in each parent
    ///    directory, using `module`, then `main` from `package.json`, then
    ///    `index.js` / `index.mjs`
    pub fn resolve(&self, specifier: &str) -> Result<PathBuf, ResolveError> {
        let name = self
            .module_name(specifier)
            .ok_or_else(|| ResolveError::NotVirtual(specifier.to_string()))?;

        let mut tried = Vec::new();

        if let Some(path) = self.modules.get(name) {
            tracing::trace!(specifier, path = %path.display(), "virtual import from table");
            tried.push(path.clone());
            if path.is_file() {
                return canonicalize(path);
            }
        }

        if let Some(root) = &self.install_root {
            let mut current = Some(root.as_path());
            while let Some(dir) = current {
                let package_dir = dir.join("node_modules").join(name);
                tried.push(package_dir.clone());
                if package_dir.is_dir() {
                    if let Some(entry) = package_entry(&package_dir, &mut tried)? {
                        tracing::trace!(specifier, path = %entry.display(), "virtual import from package");
                        return canonicalize(&entry);
                    }
                }
                current = dir.parent();
            }
        }

        Err(ResolveError::ModuleNotFound {
            specifier: specifier.to_string(),
            tried,
        })
    }
}

/// Find the entry file of an installed package
fn package_entry(dir: &Path, tried: &mut Vec<PathBuf>) -> Result<Option<PathBuf>, ResolveError> {
    let manifest_path = dir.join("package.json");
    let manifest = if manifest_path.is_file() {
        let content = std::fs::read_to_string(&manifest_path)
            .map_err(|e| ResolveError::IoError(format!("{}: {}", manifest_path.display(), e)))?;
        serde_json::from_str::<PackageJson>(&content).map_err(|e| {
            ResolveError::InvalidPackageJson {
                path: manifest_path.clone(),
                message: e.to_string(),
            }
        })?
    } else {
        PackageJson::default()
    };

    let declared = [manifest.module, manifest.main];
    for entry in declared.iter().flatten() {
        let base = dir.join(entry);
        let candidates = [
            base.clone(),
            append_extension(&base, "js"),
            base.join("index.js"),
        ];
        for candidate in candidates {
            tried.push(candidate.clone());
            if candidate.is_file() {
                return Ok(Some(candidate));
            }
        }
    }

    for index in ["index.js", "index.mjs"] {
        let candidate = dir.join(index);
        tried.push(candidate.clone());
        if candidate.is_file() {
            return Ok(Some(candidate));
        }
    }

    Ok(None)
}

fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut s = path.as_os_str().to_os_string();
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}

fn canonicalize(path: &Path) -> Result<PathBuf, ResolveError> {
    path.canonicalize()
        .map_err(|e| ResolveError::IoError(format!("Failed to canonicalize {}: {}", path.display(), e)))
}
