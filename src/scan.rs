// src/scan.rs
//
// Byte-level scanning primitives shared by the tag parser, the closing tag
// matcher and the iterator. All offsets are byte offsets into UTF-8 input;
// every delimiter searched for is ASCII, so any offset returned here is a
// valid `str` boundary.

use memchr::memchr;
use memchr::memmem;

/* ============================ Utility predicates ========================= */

#[inline]
pub(crate) fn is_ws(b: u8) -> bool {
    b == b' ' || b == b'\t' || b == b'\n' || b == b'\r' || b == b'\x0c'
}

#[inline]
pub(crate) fn is_ws_char(c: char) -> bool {
    c.is_ascii() && is_ws(c as u8)
}

pub(crate) fn matches_ignore_ascii_case(name: &str, set: &[&str]) -> bool {
    set.iter().any(|&s| name.eq_ignore_ascii_case(s))
}

/* ================================ Searching ============================== */

/// First index `>= i` that is not whitespace, or `s.len()`.
pub(crate) fn skip_ws(s: &[u8], mut i: usize) -> usize {
    while i < s.len() && is_ws(s[i]) {
        i += 1;
    }
    i
}

/// First index `>= i` that is whitespace, or `s.len()`.
pub(crate) fn next_ws(s: &[u8], mut i: usize) -> usize {
    while i < s.len() && !is_ws(s[i]) {
        i += 1;
    }
    i
}

pub(crate) fn find_byte(s: &[u8], b: u8, from: usize) -> Option<usize> {
    if from >= s.len() {
        return None;
    }
    memchr(b, &s[from..]).map(|off| from + off)
}

pub(crate) fn find_sub(s: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from >= s.len() {
        return None;
    }
    memmem::find(&s[from..], needle).map(|off| from + off)
}

/// Case-insensitive `s[at..].starts_with(prefix)`.
pub(crate) fn starts_with_ignore_ascii_case(s: &[u8], at: usize, prefix: &[u8]) -> bool {
    s.len() >= at + prefix.len() && s[at..at + prefix.len()].eq_ignore_ascii_case(prefix)
}

/* ================================ Trimming =============================== */

pub(crate) fn trim_ws(s: &str) -> &str {
    s.trim_matches(is_ws_char)
}

pub(crate) fn trim_end_ws(s: &str) -> &str {
    s.trim_end_matches(is_ws_char)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_classification() {
        for b in [b' ', b'\t', b'\n', b'\r', b'\x0c'] {
            assert!(is_ws(b));
        }
        assert!(!is_ws(b'a'));
        assert!(!is_ws_char('\u{a0}'));
    }

    #[test]
    fn skipping_and_finding() {
        let s = b"  ab  c";
        assert_eq!(skip_ws(s, 0), 2);
        assert_eq!(next_ws(s, 2), 4);
        assert_eq!(skip_ws(s, 7), 7);
        assert_eq!(find_byte(s, b'c', 0), Some(6));
        assert_eq!(find_byte(s, b'c', 7), None);
        assert_eq!(find_sub(b"a-->b-->", b"-->", 2), Some(5));
        assert_eq!(find_sub(b"abc", b"-->", 0), None);
    }

    #[test]
    fn case_insensitive_prefix() {
        let s = b"<![cdata[x]]>";
        assert!(starts_with_ignore_ascii_case(s, 0, b"<![CDATA["));
        assert!(!starts_with_ignore_ascii_case(s, 5, b"<![CDATA["));
        assert!(matches_ignore_ascii_case("SPAN", &["b", "span"]));
    }

    #[test]
    fn trimming() {
        assert_eq!(trim_ws(" \n x y\t"), "x y");
        assert_eq!(trim_end_ws("br /  "), "br /");
    }
}
