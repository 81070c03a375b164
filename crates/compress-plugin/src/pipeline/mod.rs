//! Transform pipelines
//!
//! - **load**: intercepts host loads of matching source files
//! - **end**: rewrites matching artifacts after the bundle is emitted
//!
//! Both run content through the same encoder and laziness wrapper.

pub mod end;
pub mod load;

pub use end::{fix_extension, rewrite_outputs};
pub use load::load_file;

use std::path::Path;

use crate::encoder::{Encoder, GeneratedModule};
use crate::error::PluginError;
use crate::lazy::make_lazy;
use crate::spec::CompressorSpec;

/// Encode content for a spec, applying the lazy wrapper when requested
pub fn generate(
    encoder: &Encoder,
    spec: &CompressorSpec,
    raw: &str,
    path: &Path,
) -> Result<GeneratedModule, PluginError> {
    let mut module = encoder
        .encode(raw, spec.loader)
        .map_err(|source| PluginError::Json {
            path: path.to_path_buf(),
            source,
        })?;

    if spec.lazy {
        module.contents = make_lazy(&module.contents, encoder.namespace());
    }

    tracing::debug!(
        path = %path.display(),
        loader = %spec.loader,
        lazy = spec.lazy,
        raw_bytes = raw.len(),
        generated_bytes = module.contents.len(),
        "compressed asset"
    );

    Ok(module)
}
