// src/matcher.rs
//
// Locating tag boundaries:
// - what sits at a '<' (a tag, a skippable comment/CDATA run, or a literal '<'),
// - the '>' terminating a tag, quote-aware for attribute values,
// - the closing tag matching a container, folding nested same-named tags.

use crate::error::{Error, Result};
use crate::scan::{find_byte, find_sub, is_ws, skip_ws, starts_with_ignore_ascii_case};
use crate::tag::tag_name;

/// What the bytes starting at a `<` are.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Sequence {
    /// A tag to be parsed.
    Tag,
    /// A comment or CDATA run; scanning resumes at `end`.
    Skip { end: usize },
    /// Not markup: the `<` belongs to the text.
    Literal,
}

/// Offsets of a located closing tag: `start` is its `<`, `end` its `>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ClosingTag {
    pub start: usize,
    pub end: usize,
}

/// Classify the sequence at `s[lt] == b'<'`.
pub(crate) fn classify(s: &[u8], lt: usize) -> Sequence {
    if s[lt..].starts_with(b"<!--") {
        return match find_sub(s, b"-->", lt + 4) {
            Some(p) => Sequence::Skip { end: p + 3 },
            None => Sequence::Literal,
        };
    }
    if starts_with_ignore_ascii_case(s, lt, b"<![CDATA[") {
        return match find_sub(s, b"]]>", lt + 9) {
            Some(p) => Sequence::Skip { end: p + 3 },
            None => Sequence::Literal,
        };
    }
    match s.get(lt + 1) {
        None => Sequence::Literal,
        Some(&b) if is_ws(b) => Sequence::Literal,
        Some(_) => Sequence::Tag,
    }
}

/// Find the `>` of the tag opened at `s[lt] == b'<'`.
///
/// Quotes only count when they open an attribute value (follow `=`). If a
/// quote never closes, the first plain `>` is used so a broken attribute
/// does not swallow the rest of the input.
pub(crate) fn find_tag_end(s: &[u8], lt: usize) -> Result<usize> {
    let n = s.len();
    let mut i = lt + 1;
    let mut quote: u8 = 0;
    let mut prev: u8 = 0;
    while i < n {
        let b = s[i];
        if quote != 0 {
            if b == quote {
                quote = 0;
                prev = b;
            }
        } else if (b == b'"' || b == b'\'') && prev == b'=' {
            quote = b;
        } else if b == b'>' {
            return Ok(i);
        } else if !is_ws(b) {
            prev = b;
        }
        i += 1;
    }
    find_byte(s, b'>', lt + 1).ok_or(Error::MissingTagTerminator { offset: lt })
}

/// Find the closing tag matching a `name` container whose content starts at
/// `from`. Same-named opening tags met on the way are counted so that their
/// own closing tags are not taken for ours.
pub(crate) fn find_closing_tag(input: &str, name: &str, from: usize) -> Result<ClosingTag> {
    let s = input.as_bytes();
    let mut nested = 0usize;
    let mut i = from;

    while let Some(lt) = find_byte(s, b'<', i) {
        match classify(s, lt) {
            Sequence::Skip { end } => {
                i = end;
                continue;
            }
            Sequence::Literal => {
                i = lt + 1;
                continue;
            }
            Sequence::Tag => {}
        }

        // No later tag can be complete either.
        let Ok(gt) = find_tag_end(s, lt) else { break };

        let body = &input[lt + 1..gt];
        let (tag, closing, _) = tag_name(body);
        if tag.eq_ignore_ascii_case(name) {
            if closing {
                if nested == 0 {
                    return Ok(ClosingTag { start: lt, end: gt });
                }
                nested -= 1;
            } else if !body.trim_end().ends_with('/') {
                nested += 1;
            }
        }
        i = gt + 1;
    }

    Err(Error::UnmatchedClosingTag {
        name: name.to_owned(),
        offset: from,
    })
}

/// Find `</name` for a raw text container such as `<script>`, whose content
/// is never markup.
pub(crate) fn find_raw_closing_tag(input: &str, name: &str, from: usize) -> Result<ClosingTag> {
    let s = input.as_bytes();
    let mut i = from;

    while let Some(lt) = find_byte(s, b'<', i) {
        let name_at = skip_ws(s, lt + 2);
        let is_candidate = s.get(lt + 1) == Some(&b'/')
            && starts_with_ignore_ascii_case(s, name_at, name.as_bytes())
            && s
                .get(name_at + name.len())
                .map_or(true, |&b| is_ws(b) || b == b'>' || b == b'/');
        if is_candidate {
            if let Ok(gt) = find_tag_end(s, lt) {
                return Ok(ClosingTag { start: lt, end: gt });
            }
            break;
        }
        i = lt + 1;
    }

    Err(Error::UnmatchedClosingTag {
        name: name.to_owned(),
        offset: from,
    })
}
