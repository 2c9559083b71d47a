// src/text.rs
//
// Pending text accumulation and contextual whitespace normalization.

use crate::scan::{is_ws_char, trim_ws};
use crate::tag::is_inline;

/// The text run between the last consumed tag and the next one.
#[derive(Debug, Default)]
pub(crate) struct PendingText {
    buf: String,
}

impl PendingText {
    /// Append `chunk`. Outside `<pre>` every whitespace run collapses into a
    /// single space as it is appended.
    pub fn push_str(&mut self, chunk: &str, preserve: bool) {
        if preserve {
            self.buf.push_str(chunk);
            return;
        }
        for c in chunk.chars() {
            if is_ws_char(c) {
                if !self.buf.ends_with(' ') {
                    self.buf.push(' ');
                }
            } else {
                self.buf.push(c);
            }
        }
    }

    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.buf)
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }
}

/// Collapse every whitespace run of `text` into one space. Leading and
/// trailing runs are kept as a single space.
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_ws = false;
    for c in text.chars() {
        if is_ws_char(c) {
            if !in_ws {
                out.push(' ');
            }
            in_ws = true;
        } else {
            out.push(c);
            in_ws = false;
        }
    }
    out
}

/// Decides whether and how a pending run is emitted, based on the last
/// entered container and the last emitted run.
///
/// Only the most recent entered tag name and the last character of the most
/// recent emitted text are needed, so nothing else is retained.
#[derive(Debug, Default)]
pub(crate) struct TextNormalizer {
    previous_tag: Option<String>,
    previous_text_tail: Option<char>,
}

impl TextNormalizer {
    /// Record a container tag that was entered.
    pub fn record_entered(&mut self, name: &str) {
        match &mut self.previous_tag {
            Some(previous) => {
                previous.clear();
                previous.push_str(name);
            }
            None => self.previous_tag = Some(name.to_owned()),
        }
    }

    /// Normalize `pending` against the tag that terminates it (`None` at end
    /// of input). Returns the text to emit, remembering it as the previous
    /// run, or `None` when nothing is left to emit.
    pub fn finish(&mut self, pending: String, terminating: Option<&str>, in_pre: bool) -> Option<String> {
        if pending.is_empty() {
            return None;
        }
        if in_pre {
            self.previous_text_tail = pending.chars().last();
            return Some(pending);
        }

        let mut text = collapse_whitespace(&pending);
        match (&self.previous_tag, self.previous_text_tail) {
            (Some(previous), Some(tail)) => {
                let inline_pair = is_inline(previous) && terminating.is_some_and(is_inline);
                if (!inline_pair || tail == ' ') && text.starts_with(' ') {
                    text.remove(0);
                }
            }
            _ => {
                let trimmed = trim_ws(&text);
                if trimmed.len() != text.len() {
                    text = trimmed.to_owned();
                }
            }
        }

        if text.is_empty() {
            return None;
        }
        self.previous_text_tail = text.chars().last();
        Some(text)
    }

    pub fn clear(&mut self) {
        self.previous_tag = None;
        self.previous_text_tail = None;
    }
}
