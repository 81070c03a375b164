//! Property tests for the payload encoder

use compress_plugin::encoder::{canonical_json, extract_payload};
use compress_plugin::lazy::make_lazy;
use compress_plugin::literal::{escape, quote, unescape};
use compress_plugin::{Encoder, Loader, StringCompressor};
use proptest::prelude::*;
use std::sync::Arc;

/// Passes content through untouched, so every special character reaches the
/// template literal
struct Verbatim;

impl StringCompressor for Verbatim {
    fn compress(&self, input: &str) -> String {
        input.to_string()
    }

    fn decompress(&self, payload: &str) -> Option<String> {
        Some(payload.to_string())
    }
}

fn tricky_text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just("`".to_string()),
            Just("\\".to_string()),
            Just("$".to_string()),
            Just("${".to_string()),
            Just("\r\n".to_string()),
            Just("dc(`".to_string()),
            Just("export default ".to_string()),
            "\\PC{0,8}",
        ],
        1..24,
    )
    .prop_map(|parts| parts.concat())
}

/// Template literal body is well formed: no raw backtick, no `${`, no CR,
/// and every backslash starts a known escape
fn is_well_formed_literal_body(body: &str) -> bool {
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if !matches!(chars.next(), Some('`' | '\\' | '$' | 'r')) {
                    return false;
                }
            }
            '`' | '$' | '\r' => return false,
            _ => {}
        }
    }
    true
}

proptest! {
    #[test]
    fn prop_text_round_trip(input in "\\PC{1,200}") {
        let encoder = Encoder::new("compress");
        let module = encoder.encode(&input, Loader::Text).unwrap();
        prop_assert_eq!(encoder.decode(&module.contents), Some(input));
    }

    #[test]
    fn prop_text_round_trip_tricky(input in tricky_text()) {
        let encoder = Encoder::new("compress");
        let module = encoder.encode(&input, Loader::Text).unwrap();
        prop_assert_eq!(encoder.decode(&module.contents), Some(input));
    }

    #[test]
    fn prop_escaped_payload_stays_inside_literal(input in tricky_text()) {
        let encoder = Encoder::with_compressor("compress", Arc::new(Verbatim));
        let module = encoder.encode(&input, Loader::Text).unwrap();

        let quoted = quote(&input);
        let expected = format!("export default dc({})\n", quoted);
        prop_assert!(module.contents.ends_with(&expected));
        prop_assert!(is_well_formed_literal_body(&quoted[1..quoted.len() - 1]));
        prop_assert_eq!(extract_payload(&module.contents), Some(input));
    }

    #[test]
    fn prop_unescape_inverts_escape(input in "\\PC*") {
        prop_assert_eq!(unescape(&escape(&input)), Some(input));
    }

    #[test]
    fn prop_lazy_keeps_payload(input in tricky_text()) {
        let encoder = Encoder::new("compress");
        let eager = encoder.encode(&input, Loader::Text).unwrap();
        let lazy = make_lazy(&eager.contents, "compress");

        prop_assert_eq!(extract_payload(&lazy), extract_payload(&eager.contents));
        prop_assert_eq!(make_lazy(&lazy, "compress"), lazy.clone());
        prop_assert_eq!(lazy.matches("export default").count(), 1);
    }

    #[test]
    fn prop_json_normalization(
        entries in prop::collection::btree_map("[a-z]{1,6}", any::<i32>(), 0..8),
        reverse in any::<bool>(),
    ) {
        // Same object written with a different key order and spacing
        let mut pairs: Vec<_> = entries.iter().collect();
        if reverse {
            pairs.reverse();
        }
        let compact = serde_json::to_string(&entries).unwrap();
        let spaced = format!(
            "{{ {} }}",
            pairs
                .iter()
                .map(|(k, v)| format!("\"{}\" :  {}", k, v))
                .collect::<Vec<_>>()
                .join(",\n  ")
        );

        let encoder = Encoder::new("compress");
        let a = encoder.encode(&compact, Loader::Json).unwrap();
        let b = encoder.encode(&spaced, Loader::Json).unwrap();
        prop_assert_eq!(extract_payload(&a.contents), extract_payload(&b.contents));
        prop_assert_eq!(canonical_json(&compact).unwrap(), canonical_json(&spaced).unwrap());
    }
}
