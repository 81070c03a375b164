//! JavaScript template literal encoding
//!
//! Payloads are embedded in generated modules as template literals. Every
//! sequence the template literal grammar treats specially is escaped so the
//! cooked value of the literal is exactly the input string.

/// Characters that must be escaped inside a template literal, with their
/// escaped form
///
/// - `` ` `` terminates the literal
/// - `\` starts an escape sequence
/// - `$` starts `${` interpolation
/// - CR is normalized to LF by the template literal grammar
const ESCAPES: &[(char, &str)] = &[
    ('`', "\\`"),
    ('\\', "\\\\"),
    ('$', "\\$"),
    ('\r', "\\r"),
];

/// Escape a string for use between backticks
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match ESCAPES.iter().find(|(special, _)| *special == c) {
            Some((_, escaped)) => out.push_str(escaped),
            None => out.push(c),
        }
    }
    out
}

/// Escape a string and wrap it in backticks
pub fn quote(s: &str) -> String {
    format!("`{}`", escape(s))
}

/// Reverse [`escape`]
///
/// Returns `None` if the input contains an unescaped special character or an
/// escape sequence `escape` never produces.
pub fn unescape(s: &str) -> Option<String> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next()? {
                'r' => out.push('\r'),
                next @ ('`' | '\\' | '$') => out.push(next),
                _ => return None,
            },
            '`' | '$' | '\r' => return None,
            other => out.push(other),
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_plain() {
        assert_eq!(escape("N4IgZg9hIGwA"), "N4IgZg9hIGwA");
        assert_eq!(quote("abc+/="), "`abc+/=`");
    }

    #[test]
    fn test_escape_specials() {
        assert_eq!(escape("`"), "\\`");
        assert_eq!(escape("\\"), "\\\\");
        assert_eq!(escape("${x}"), "\\${x}");
        assert_eq!(escape("a\r\nb"), "a\\r\nb");
        assert_eq!(quote("`\\$"), "`\\`\\\\\\$`");
    }

    #[test]
    fn test_unescape_inverts_escape() {
        for input in ["", "plain", "`", "\\", "$", "${a}", "\\`", "\r\n", "héllo ✓ `$\\"] {
            assert_eq!(unescape(&escape(input)).as_deref(), Some(input));
        }
    }

    #[test]
    fn test_unescape_rejects_raw_specials() {
        assert_eq!(unescape("a`b"), None);
        assert_eq!(unescape("${x}"), None);
        assert_eq!(unescape("\\n"), None);
        assert_eq!(unescape("trailing\\"), None);
    }
}
