//! Payload encoder
//!
//! Turns raw text or JSON into a JavaScript module whose default export
//! reconstructs the original value:
//!
//! ```text
//! import{decompressFromBase64 as dc}from"compress:lz-string"
//! export default dc(`<payload>`)
//! ```
//!
//! JSON content is parsed and re-serialized before compression and the
//! module wraps the decompressed string in `JSON.parse(..)`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::literal;
use crate::spec::Loader;

/// Loader tag of a generated module
///
/// Generated modules are always JavaScript source, whatever the original
/// asset was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputLoader {
    Js,
}

impl OutputLoader {
    /// Host loader name
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputLoader::Js => "js",
        }
    }

    /// File extension (without the dot) hosts recognize for this loader
    pub fn extension(&self) -> &'static str {
        match self {
            OutputLoader::Js => "js",
        }
    }
}

impl fmt::Display for OutputLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A module produced in place of an asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedModule {
    /// JavaScript source
    pub contents: String,
    /// Always [`OutputLoader::Js`]
    pub loader: OutputLoader,
}

/// String compression service used for payloads
///
/// The generated module decompresses with lz-string's
/// `decompressFromBase64`, so implementations must produce payloads in that
/// format.
pub trait StringCompressor: Send + Sync {
    /// Compress a string into a base64 payload
    fn compress(&self, input: &str) -> String;

    /// Decompress a payload produced by [`StringCompressor::compress`]
    fn decompress(&self, payload: &str) -> Option<String>;
}

/// lz-string base64 compression
#[derive(Debug, Clone, Copy, Default)]
pub struct LzString;

impl StringCompressor for LzString {
    fn compress(&self, input: &str) -> String {
        lz_str::compress_to_base64(input)
    }

    fn decompress(&self, payload: &str) -> Option<String> {
        let wide = lz_str::decompress_from_base64(payload)?;
        String::from_utf16(&wide).ok()
    }
}

/// Builds generated modules for one virtual namespace
#[derive(Clone)]
pub struct Encoder {
    namespace: String,
    compressor: Arc<dyn StringCompressor>,
}

impl fmt::Debug for Encoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Encoder")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl Encoder {
    /// Create an lz-string encoder importing its runtime from `namespace`
    pub fn new(namespace: impl Into<String>) -> Self {
        Self::with_compressor(namespace, Arc::new(LzString))
    }

    /// Create an encoder with a custom compression service
    pub fn with_compressor(
        namespace: impl Into<String>,
        compressor: Arc<dyn StringCompressor>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            compressor,
        }
    }

    /// Virtual namespace of the runtime imports
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Encode raw content into a generated module
    ///
    /// Fails only for `json` content that does not parse.
    pub fn encode(&self, raw: &str, loader: Loader) -> Result<GeneratedModule, serde_json::Error> {
        let call = match loader {
            Loader::Text => self.decompress_call(raw),
            Loader::Json => format!("JSON.parse({})", self.decompress_call(&canonical_json(raw)?)),
        };

        let contents = format!(
            "import{{decompressFromBase64 as dc}}from\"{}:lz-string\"\nexport default {}\n",
            self.namespace, call
        );

        Ok(GeneratedModule {
            contents,
            loader: OutputLoader::Js,
        })
    }

    /// Recover the original string from a generated module
    ///
    /// For `json` modules this is the canonical JSON text.
    pub fn decode(&self, source: &str) -> Option<String> {
        let payload = extract_payload(source)?;
        self.compressor.decompress(&payload)
    }

    fn decompress_call(&self, content: &str) -> String {
        format!("dc({})", literal::quote(&self.compressor.compress(content)))
    }
}

/// Re-serialize JSON compactly with sorted object keys
///
/// Documents that parse to the same value yield the same string. Numbers
/// keep the text they were written with, so values outside the `f64` range
/// such as `1e400` pass through for `JSON.parse` to interpret. Nesting depth
/// is unbounded; the stack grows on demand.
pub fn canonical_json(raw: &str) -> Result<String, serde_json::Error> {
    let mut de = serde_json::Deserializer::from_str(raw);
    de.disable_recursion_limit();
    let value = serde_json::Value::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;

    let mut out = Vec::with_capacity(raw.len());
    let mut ser = serde_json::Serializer::new(&mut out);
    value.serialize(serde_stacker::Serializer::new(&mut ser))?;
    String::from_utf8(out).map_err(serde::ser::Error::custom)
}

/// Extract the unescaped payload of a generated module
pub fn extract_payload(source: &str) -> Option<String> {
    const OPEN: &str = "dc(`";

    let start = source.find(OPEN)? + OPEN.len();
    let rest = &source[start..];
    let mut escaped = false;
    for (i, c) in rest.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '`' => return literal::unescape(&rest[..i]),
            _ => {}
        }
    }
    None
}
