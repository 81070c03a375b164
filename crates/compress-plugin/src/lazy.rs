//! Lazy default exports
//!
//! Rewrites a generated module so decompression runs on first access instead
//! of at module evaluation.

const EXPORT_DEFAULT: &str = "export default ";

/// Defer the default export of a generated module
///
/// ```text
/// import PL from"compress:p-lazy"
/// import{decompressFromBase64 as dc}from"compress:lz-string"
/// export default PL.from(()=>(dc(`...`)))
/// ```
///
/// The default export becomes a `p-lazy` promise: consumers must `await` it
/// (or call `.then`) to get the value, and the value is computed once, on the
/// first such access. Modules that already import the lazy helper are
/// returned unchanged, as are sources without a default export.
pub fn make_lazy(source: &str, namespace: &str) -> String {
    if is_lazy(source, namespace) {
        return source.to_string();
    }
    let import = lazy_import(namespace);

    let Some(pos) = find_export_default(source) else {
        return source.to_string();
    };
    let expr = source[pos + EXPORT_DEFAULT.len()..].trim_end_matches('\n');

    format!(
        "{import}\n{head}{EXPORT_DEFAULT}PL.from(()=>({expr}))\n",
        head = &source[..pos],
    )
}

/// Whether a generated module has a lazy default export
pub fn is_lazy(source: &str, namespace: &str) -> bool {
    source.starts_with(&lazy_import(namespace))
}

fn lazy_import(namespace: &str) -> String {
    format!("import PL from\"{namespace}:p-lazy\"")
}

fn find_export_default(source: &str) -> Option<usize> {
    if source.starts_with(EXPORT_DEFAULT) {
        return Some(0);
    }
    source
        .find(&format!("\n{EXPORT_DEFAULT}"))
        .map(|pos| pos + 1)
}
