// src/tag.rs
//
// Tag records and the tag body parser.
//
// A tag body is the raw text between `<` and `>`, exclusive of both. The
// parser extracts the canonical name, the attribute map and the class
// list from it without ever failing: malformed attributes are skipped and
// the last one is kept on the record for the iterator to report.

use std::collections::HashMap;
use std::ops::Range;

use tracing::debug;

use crate::error::{Error, Result};
use crate::scan::{
    find_byte, is_ws, matches_ignore_ascii_case, next_ws, skip_ws, trim_end_ws, trim_ws,
};

/* =============================== Core sets =============================== */

const VOID_TAGS: &[&str] = &[
    "img", "input", "br", "hr", "meta", "link", "area", "base", "col", "source", "track", "wbr",
];

const INLINE_TAGS: &[&str] = &[
    "span", "a", "b", "i", "u", "strong", "em", "mark", "small", "del", "ins", "sub", "sup",
];

/// Whether `name` is a void element, one that never has a closing tag.
pub fn is_void(name: &str) -> bool {
    matches_ignore_ascii_case(name, VOID_TAGS)
}

/// Whether `name` is an inline element for whitespace adjacency purposes.
/// Everything else is block-like.
pub fn is_inline(name: &str) -> bool {
    matches_ignore_ascii_case(name, INLINE_TAGS)
}

/* ================================ TagRecord ============================== */

/// One tag occurrence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagRecord {
    name: String,
    raw_body: String,
    closing: bool,
    attributes: HashMap<String, String>,
    classes: Vec<String>,
    self_closing: bool,
    pair_content: Option<Range<usize>>,
    quoting_error: Option<Error>,
}

impl TagRecord {
    /// Parse a tag from its body, the text between `<` and `>`.
    pub fn parse(raw_body: &str) -> Self {
        let (name, closing, name_end) = tag_name(raw_body);
        let name = name.to_ascii_lowercase();
        let (attributes, quoting_error) = if closing {
            (HashMap::new(), None)
        } else {
            parse_attributes(raw_body, name_end)
        };
        let classes = attributes
            .get("class")
            .map(|value| split_classes(value))
            .unwrap_or_default();
        let self_closing = trim_end_ws(raw_body).ends_with('/') || is_void(&name);

        TagRecord {
            name,
            raw_body: raw_body.to_owned(),
            closing,
            attributes,
            classes,
            self_closing,
            pair_content: None,
            quoting_error,
        }
    }

    /// Lowercase tag name without the closing `/`, e.g. `p` for both `<p>` and `</p>`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The text between `<` and `>`.
    pub fn raw_body(&self) -> &str {
        &self.raw_body
    }

    /// True for `</name>`.
    pub fn is_closing(&self) -> bool {
        self.closing
    }

    /// True for void elements and for bodies ending with `/`.
    pub fn is_self_closing(&self) -> bool {
        self.self_closing
    }

    pub fn attributes(&self) -> &HashMap<String, String> {
        &self.attributes
    }

    /// Value of attribute `name`; valueless attributes yield `Some("")`.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Class tokens in source order, duplicates kept.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Byte range of the content between the opening and closing tag.
    /// Set only on containers whose closing tag was located.
    pub fn pair_content(&self) -> Option<Range<usize>> {
        self.pair_content.clone()
    }

    pub(crate) fn set_pair_content(&mut self, range: Range<usize>) {
        self.pair_content = Some(range);
    }

    /// The last attribute dropped for an unterminated quote, if any.
    pub(crate) fn quoting_error(&self) -> Option<&Error> {
        self.quoting_error.as_ref()
    }
}

/* =============================== Tag parsing ============================= */

/// Split a tag body into its raw name, the closing flag and the offset just
/// past the name. The name ends at whitespace or at a `/` that is not the
/// leading closing marker.
pub(crate) fn tag_name(body: &str) -> (&str, bool, usize) {
    let bytes = body.as_bytes();
    let n = bytes.len();
    let mut i = skip_ws(bytes, 0);

    let closing = i < n && bytes[i] == b'/';
    if closing {
        i = skip_ws(bytes, i + 1);
    }
    let start = i;
    while i < n && !is_ws(bytes[i]) && bytes[i] != b'/' {
        i += 1;
    }
    (&body[start..i], closing, i)
}

fn parse_attributes(body: &str, from: usize) -> (HashMap<String, String>, Option<Error>) {
    let bytes = body.as_bytes();
    let n = bytes.len();
    let mut attributes = HashMap::new();
    let mut skipped = None;
    let mut i = from;

    while i < n {
        i = skip_ws(bytes, i);
        if i >= n {
            break;
        }
        // stray '/' (self-closing marker) or '=' without a name
        if bytes[i] == b'/' || bytes[i] == b'=' {
            i += 1;
            continue;
        }

        let name_start = i;
        while i < n && !is_ws(bytes[i]) && bytes[i] != b'=' && bytes[i] != b'/' {
            i += 1;
        }
        let name = trim_ws(&body[name_start..i]).to_ascii_lowercase();

        let after_name = skip_ws(bytes, i);
        if after_name >= n || bytes[after_name] != b'=' {
            attributes.insert(name, String::new());
            i = after_name;
            continue;
        }

        let value_start = skip_ws(bytes, after_name + 1);
        match read_value(body, &name, value_start) {
            Ok((value, next)) => {
                attributes.insert(name, trim_ws(value).to_owned());
                i = next;
            }
            Err(err) => {
                debug!(%err, "skipping attribute");
                skipped = Some(err);
                i = value_start + 1;
            }
        }
    }
    (attributes, skipped)
}

/// Read the attribute value starting at `start` (just past `=` and any
/// whitespace). Returns the value and the offset just past it.
fn read_value<'a>(body: &'a str, name: &str, start: usize) -> Result<(&'a str, usize)> {
    let bytes = body.as_bytes();
    match bytes.get(start) {
        Some(&quote) if quote == b'"' || quote == b'\'' => match find_byte(bytes, quote, start + 1) {
            Some(end) => Ok((&body[start + 1..end], end + 1)),
            None => Err(Error::MalformedAttributeQuoting {
                name: name.to_owned(),
                quote: quote as char,
            }),
        },
        Some(_) => {
            let end = next_ws(bytes, start);
            Ok((&body[start..end], end))
        }
        None => Ok(("", start)),
    }
}

fn split_classes(value: &str) -> Vec<String> {
    value
        .split(|c: char| c.is_ascii_whitespace())
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_extraction() {
        assert_eq!(tag_name("p"), ("p", false, 1));
        assert_eq!(tag_name("/p"), ("p", true, 2));
        assert_eq!(tag_name("/ p "), ("p", true, 3));
        assert_eq!(tag_name("br/"), ("br", false, 2));
        assert_eq!(tag_name("div class=\"x\""), ("div", false, 3));
        assert_eq!(tag_name(""), ("", false, 0));
    }

    #[test]
    fn names_are_lowercased() {
        let tag = TagRecord::parse("DIV ID=\"Main\"");
        assert_eq!(tag.name(), "div");
        assert_eq!(tag.attribute("id"), Some("Main"));
    }

    #[test]
    fn attributes_with_and_without_values() {
        let tag = TagRecord::parse("a href=\"x\" data-y");
        assert_eq!(tag.attributes().len(), 2);
        assert_eq!(tag.attribute("href"), Some("x"));
        assert_eq!(tag.attribute("data-y"), Some(""));
        assert!(!tag.is_self_closing());
    }

    #[test]
    fn single_quotes_and_spacing() {
        let tag = TagRecord::parse("img  alt = ' some text '   src='a.png' /");
        assert_eq!(tag.attribute("alt"), Some("some text"));
        assert_eq!(tag.attribute("src"), Some("a.png"));
        assert!(tag.is_self_closing());
    }

    #[test]
    fn quote_kind_decides_terminator() {
        let tag = TagRecord::parse("p title=\"it's\" lang='say \"hi\"'");
        assert_eq!(tag.attribute("title"), Some("it's"));
        assert_eq!(tag.attribute("lang"), Some("say \"hi\""));
    }

    #[test]
    fn unquoted_values() {
        let tag = TagRecord::parse("td width=100 nowrap");
        assert_eq!(tag.attribute("width"), Some("100"));
        assert_eq!(tag.attribute("nowrap"), Some(""));
    }

    #[test]
    fn malformed_quote_skips_only_that_attribute() {
        let tag = TagRecord::parse("div id=\"main class=x");
        assert_eq!(tag.name(), "div");
        assert_eq!(tag.attribute("id"), None);
        assert_eq!(tag.attribute("main"), Some(""));
        assert_eq!(tag.attribute("class"), Some("x"));
        assert_eq!(
            tag.quoting_error(),
            Some(&Error::MalformedAttributeQuoting {
                name: "id".into(),
                quote: '"'
            })
        );
        assert_eq!(TagRecord::parse("div id=\"main\"").quoting_error(), None);
    }

    #[test]
    fn read_value_reports_unterminated_quote() {
        let err = read_value("x='abc", "x", 2).unwrap_err();
        assert_eq!(
            err,
            Error::MalformedAttributeQuoting {
                name: "x".into(),
                quote: '\''
            }
        );
    }

    #[test]
    fn classes_keep_order_and_duplicates() {
        let tag = TagRecord::parse("div class=\" main  container\n holder main \"");
        assert_eq!(tag.classes(), ["main", "container", "holder", "main"]);
        assert!(tag.has_class("holder"));
        assert!(!tag.has_class("content"));
    }

    #[test]
    fn data_class_is_not_class() {
        let tag = TagRecord::parse("div data-class=\"x\"");
        assert!(tag.classes().is_empty());
    }

    #[test]
    fn void_and_explicit_self_closing() {
        assert!(TagRecord::parse("img src=\"x\"").is_self_closing());
        assert!(TagRecord::parse("br/").is_self_closing());
        assert!(TagRecord::parse("custom-element /").is_self_closing());
        assert!(TagRecord::parse("HR").is_self_closing());
        assert!(!TagRecord::parse("div").is_self_closing());
    }

    #[test]
    fn closing_tags_carry_no_attributes() {
        let tag = TagRecord::parse("/div class=\"x\"");
        assert!(tag.is_closing());
        assert_eq!(tag.name(), "div");
        assert!(tag.attributes().is_empty());
    }

    #[test]
    fn inline_set() {
        assert!(is_inline("b"));
        assert!(is_inline("STRONG"));
        assert!(!is_inline("div"));
        assert!(!is_inline("code"));
        assert!(is_void("wbr"));
        assert!(!is_void("embed"));
    }
}
