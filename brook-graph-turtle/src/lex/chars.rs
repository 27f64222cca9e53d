//! Character classes from the Turtle / N-Triples grammars.
//!
//! The non-ASCII ranges are shared by prefixed names and blank-node labels
//! in all four syntaxes.

/// `PN_CHARS_BASE` beyond ASCII letters
const PN_CHARS_BASE_RANGES: &[(char, char)] = &[
    ('\u{00C0}', '\u{00D6}'),
    ('\u{00D8}', '\u{00F6}'),
    ('\u{00F8}', '\u{02FF}'),
    ('\u{0370}', '\u{037D}'),
    ('\u{037F}', '\u{1FFF}'),
    ('\u{200C}', '\u{200D}'),
    ('\u{2070}', '\u{218F}'),
    ('\u{2C00}', '\u{2FEF}'),
    ('\u{3001}', '\u{D7FF}'),
    ('\u{F900}', '\u{FDCF}'),
    ('\u{FDF0}', '\u{FFFD}'),
    ('\u{10000}', '\u{EFFFF}'),
];

/// Extra combining characters allowed after the first position
const PN_CHARS_EXTRA_RANGES: &[(char, char)] = &[
    ('\u{00B7}', '\u{00B7}'),
    ('\u{0300}', '\u{036F}'),
    ('\u{203F}', '\u{2040}'),
];

fn in_ranges(c: char, ranges: &[(char, char)]) -> bool {
    ranges.iter().any(|&(lo, hi)| (lo..=hi).contains(&c))
}

pub fn is_pn_chars_base(c: char) -> bool {
    c.is_ascii_alphabetic() || (!c.is_ascii() && in_ranges(c, PN_CHARS_BASE_RANGES))
}

/// `PN_CHARS_BASE | '_'`
pub fn is_pn_chars_u(c: char) -> bool {
    c == '_' || is_pn_chars_base(c)
}

/// `PN_CHARS_U | '-' | [0-9] | combining marks`
pub fn is_pn_chars(c: char) -> bool {
    is_pn_chars_u(c) || c == '-' || c.is_ascii_digit() || in_ranges(c, PN_CHARS_EXTRA_RANGES)
}

/// First character of a prefix
pub fn is_pn_prefix_start(c: char) -> bool {
    is_pn_chars_base(c)
}

/// First character of a local name (escapes handled by the caller)
pub fn is_pn_local_start(c: char) -> bool {
    c == ':' || c.is_ascii_digit() || is_pn_chars_u(c)
}

pub fn is_ws(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// Characters allowed unescaped inside `<...>`
pub fn is_iri_char(c: char) -> bool {
    c > ' ' && !matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_classes() {
        assert!(is_pn_chars_base('é'));
        assert!(!is_pn_chars_base('_'));
        assert!(is_pn_chars_u('_'));
        assert!(is_pn_chars('-'));
        assert!(is_pn_chars('\u{00B7}'));
        assert!(!is_pn_chars_base('\u{00B7}'));
        assert!(is_pn_local_start('7'));
        assert!(!is_pn_prefix_start('7'));
    }

    #[test]
    fn test_iri_chars() {
        assert!(is_iri_char('a'));
        assert!(is_iri_char('#'));
        assert!(!is_iri_char(' '));
        assert!(!is_iri_char('\u{0000}'));
        assert!(!is_iri_char('>'));
    }
}
