//! Post-emit transform
//!
//! A single on-end callback rewrites every emitted artifact matched by an
//! `on_end` spec. When several specs match one artifact, the first one in
//! registration order is used and the artifact is rewritten once.
//! Namespaces do not apply here: artifacts only have a path.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::encoder::{Encoder, OutputLoader};
use crate::error::PluginError;
use crate::host::{path_str, BuildResult, OutputFile, PluginBuild};
use crate::spec::CompressorSpec;

use super::generate;

/// Register the on-end callback if any spec has `on_end`
///
/// Returns the number of specs the callback handles.
pub fn register(encoder: &Encoder, specs: &[CompressorSpec], build: &mut dyn PluginBuild) -> usize {
    let specs: Vec<CompressorSpec> = specs.iter().filter(|spec| spec.on_end).cloned().collect();
    if specs.is_empty() {
        return 0;
    }

    let count = specs.len();
    let encoder = encoder.clone();
    build.on_end(Arc::new(move |result: &mut BuildResult| {
        rewrite_outputs(&encoder, &specs, result).map(|_| ())
    }));
    count
}

/// Rewrite the matching artifacts of a build result in place
///
/// Every replacement is generated before any artifact is touched, so an
/// error leaves the result as it was. A missing or empty artifact list is
/// not an error. Returns the number of rewritten artifacts.
pub fn rewrite_outputs(
    encoder: &Encoder,
    specs: &[CompressorSpec],
    result: &mut BuildResult,
) -> Result<usize, PluginError> {
    let Some(files) = result.output_files.as_mut() else {
        return Ok(0);
    };

    let mut replacements = Vec::new();
    for (index, file) in files.iter().enumerate() {
        let path = path_str(&file.path);
        let mut matching = specs.iter().filter(|spec| spec.matches(&path));
        let Some(spec) = matching.next() else {
            continue;
        };

        let ignored = matching.count();
        if ignored > 0 {
            tracing::debug!(path = %path, ignored, "artifact matches several on-end compressors, using the first");
        }

        replacements.push((index, replacement(encoder, spec, file)?));
    }

    let rewritten = replacements.len();
    for (index, (path, contents)) in replacements {
        let file = &mut files[index];
        file.set_contents(contents);
        file.path = path;
    }

    Ok(rewritten)
}

/// Generate the new path and contents of one artifact
pub fn replacement(
    encoder: &Encoder,
    spec: &CompressorSpec,
    file: &OutputFile,
) -> Result<(PathBuf, Vec<u8>), PluginError> {
    let module = generate(encoder, spec, file.text()?, &file.path)?;
    Ok((fix_extension(&file.path, module.loader), module.contents.into_bytes()))
}

/// Append the loader's extension unless the path already has it
///
/// `out/data.txt` becomes `out/data.txt.js`; `out/data.js` is unchanged.
pub fn fix_extension(path: &Path, loader: OutputLoader) -> PathBuf {
    if path
        .extension()
        .is_some_and(|ext| ext == loader.extension())
    {
        return path.to_path_buf();
    }

    let mut s = path.as_os_str().to_os_string();
    s.push(".");
    s.push(loader.extension());
    PathBuf::from(s)
}
