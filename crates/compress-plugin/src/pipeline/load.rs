//! Load-time transform
//!
//! One on-load callback per load-time spec, keyed by the spec's filter and
//! namespace. Each invocation only touches its own candidate file, so the host
//! may run them concurrently.

use std::path::Path;
use std::sync::Arc;

use crate::encoder::{Encoder, GeneratedModule};
use crate::error::PluginError;
use crate::host::{LoadArgs, LoadOptions, LoadResult, PluginBuild};
use crate::spec::CompressorSpec;

use super::generate;

/// Register on-load callbacks for every spec without `on_end`
///
/// Returns the number of callbacks registered.
pub fn register(encoder: &Encoder, specs: &[CompressorSpec], build: &mut dyn PluginBuild) -> usize {
    let mut count = 0;
    for spec in specs.iter().filter(|spec| !spec.on_end) {
        let options = LoadOptions {
            filter: spec.filter.clone(),
            namespace: spec.namespace.clone(),
        };
        let encoder = encoder.clone();
        let spec = spec.clone();
        build.on_load(
            options,
            Arc::new(move |args: &LoadArgs| {
                let module = load_file(&encoder, &spec, &args.path)?;
                Ok(Some(LoadResult {
                    contents: module.contents,
                    loader: module.loader,
                }))
            }),
        );
        count += 1;
    }
    count
}

/// Read a candidate file and generate its replacement module
pub fn load_file(
    encoder: &Encoder,
    spec: &CompressorSpec,
    path: &Path,
) -> Result<GeneratedModule, PluginError> {
    let bytes = std::fs::read(path).map_err(|source| PluginError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let raw = String::from_utf8(bytes).map_err(|_| PluginError::InvalidUtf8(path.to_path_buf()))?;
    generate(encoder, spec, &raw, path)
}
