//! The compress plugin
//!
//! Setup validates every compressor entry first, so a bad entry aborts the
//! build before any callback is registered or any file is read. It then
//! registers:
//! 1. one on-resolve callback for `<namespace>:` runtime imports
//! 2. one on-load callback per load-time compressor
//! 3. one on-end callback covering all post-emit compressors

use regex::Regex;
use std::sync::Arc;

use crate::config::PluginOptions;
use crate::encoder::{Encoder, StringCompressor};
use crate::error::PluginError;
use crate::host::{Plugin, PluginBuild, ResolveArgs, ResolveOptions, ResolveResult};
use crate::pipeline::{end, load};
use crate::resolver::VirtualModuleResolver;
use crate::spec::CompressorSpec;

/// Plugin name reported to the host
pub const PLUGIN_NAME: &str = "compress";

/// Bundler plugin replacing assets with compressed modules
#[derive(Debug, Clone)]
pub struct CompressPlugin {
    options: PluginOptions,
    encoder: Encoder,
}

impl CompressPlugin {
    /// Create a plugin using lz-string compression
    pub fn new(options: PluginOptions) -> Self {
        let encoder = Encoder::new(options.namespace.clone());
        Self { options, encoder }
    }

    /// Create a plugin with a custom compression service
    pub fn with_compressor(options: PluginOptions, compressor: Arc<dyn StringCompressor>) -> Self {
        let encoder = Encoder::with_compressor(options.namespace.clone(), compressor);
        Self { options, encoder }
    }

    /// Options the plugin was created with
    pub fn options(&self) -> &PluginOptions {
        &self.options
    }

    /// Validate every compressor entry, in order
    pub fn specs(&self) -> Result<Vec<CompressorSpec>, PluginError> {
        self.options
            .compressors
            .iter()
            .map(CompressorSpec::try_from)
            .collect()
    }

    /// Build the runtime import resolver
    ///
    /// Runtime helpers must come from the plugin's own installation, never
    /// from the program being bundled. Without a configured install root
    /// only the `runtime-modules` table is consulted, so a helper that is
    /// not listed there fails to resolve.
    pub fn resolver(&self) -> VirtualModuleResolver {
        let mut resolver = VirtualModuleResolver::new(self.options.namespace.clone());
        if let Some(root) = &self.options.install_root {
            resolver = resolver.with_install_root(root.clone());
        }
        for (name, path) in &self.options.runtime_modules {
            resolver = resolver.with_module(name.clone(), path.clone());
        }
        resolver
    }
}

impl Default for CompressPlugin {
    fn default() -> Self {
        Self::new(PluginOptions::default())
    }
}

impl Plugin for CompressPlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn setup(&self, build: &mut dyn PluginBuild) -> Result<(), PluginError> {
        self.options.validate()?;
        let specs = self.specs()?;

        let resolver = self.resolver();
        let filter = Regex::new(&resolver.filter()).map_err(|source| PluginError::InvalidFilter {
            filter: resolver.filter(),
            source,
        })?;
        build.on_resolve(
            ResolveOptions {
                filter,
                namespace: None,
            },
            Arc::new(move |args: &ResolveArgs| {
                let path = resolver.resolve(&args.path)?;
                Ok(Some(ResolveResult { path }))
            }),
        );

        let load_hooks = load::register(&self.encoder, &specs, build);
        let end_specs = end::register(&self.encoder, &specs, build);

        tracing::info!(
            namespace = %self.options.namespace,
            load_hooks,
            end_specs,
            "compress plugin registered"
        );

        Ok(())
    }
}
