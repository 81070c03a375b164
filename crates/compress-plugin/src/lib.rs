//! Compress Plugin
//!
//! A bundler plugin that shrinks large static text and JSON assets. Matching
//! files are replaced by a small JavaScript module holding an lz-string
//! payload, which is decompressed when the consuming program loads the module
//! (or on first access, for lazy compressors). Consumers keep importing the
//! asset's default export as before.
//!
//! This crate provides:
//! - Compressor specs and their TOML configuration
//! - The payload encoder and template literal escaping
//! - The lazy export wrapper
//! - Virtual module resolution for the runtime helpers
//! - Load-time and post-emit transform pipelines
//! - The host interface the plugin registers against

pub mod config;
pub mod encoder;
pub mod error;
pub mod host;
pub mod lazy;
pub mod literal;
pub mod pipeline;
pub mod plugin;
pub mod resolver;
pub mod spec;

pub use config::{ConfigError, CompressorOptions, PluginOptions, DEFAULT_NAMESPACE};
pub use encoder::{Encoder, GeneratedModule, LzString, OutputLoader, StringCompressor};
pub use error::PluginError;
pub use host::{
    BuildHooks, BuildResult, LoadArgs, LoadOptions, LoadResult, OutputFile, Plugin, PluginBuild,
    ResolveArgs, ResolveOptions, ResolveResult,
};
pub use lazy::make_lazy;
pub use plugin::{CompressPlugin, PLUGIN_NAME};
pub use resolver::{ResolveError, VirtualModuleResolver};
pub use spec::{CompressorSpec, Loader};
