// src/iterator.rs
//
// The iterator walks the content once, left to right. One step:
// - accumulates text up to the next '<' (comment/CDATA runs are skipped),
// - flushes the pending text, normalized against the tag found,
// - classifies the tag: single, script, container enter, container leave,
// - for containers, locates the matching closing tag before entering.
// All state lives in the struct, so a session can be driven to completion
// with `run()` or one `step()` at a time.

use tracing::{debug, error, trace, warn};

use crate::callback::{ContainerSpan, HtmlCallback};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::matcher::{
    classify, find_closing_tag, find_raw_closing_tag, find_tag_end, ClosingTag, Sequence,
};
use crate::scan::{find_byte, skip_ws, trim_ws};
use crate::tag::{tag_name, TagRecord};
use crate::text::{PendingText, TextNormalizer};

/// Streaming HTML iterator delivering events to a callback `C`.
///
/// ```
/// use htmliter::{ContainerSpan, HtmlCallback, HtmlIterator, TagRecord};
///
/// #[derive(Default)]
/// struct Texts(Vec<String>);
///
/// impl HtmlCallback for Texts {
///     fn on_text(&mut self, text: &str) {
///         self.0.push(text.to_owned());
///     }
///     fn on_single_tag(&mut self, _tag: &TagRecord) {}
///     fn on_script(&mut self, _tag: &TagRecord) {}
///     fn on_enter_container(&mut self, _tag: &TagRecord, _span: ContainerSpan) -> bool {
///         true
///     }
///     fn on_leave_container(&mut self, _tag: &TagRecord) {}
/// }
///
/// let mut iterator = HtmlIterator::new();
/// iterator.set_content("<p>Hello</p>\n  <p>big   <b>world</b></p>");
/// iterator.set_callback(Texts::default());
/// iterator.run().unwrap();
/// assert_eq!(iterator.callback().unwrap().0, ["Hello", "big ", "world"]);
/// ```
#[derive(Debug)]
pub struct HtmlIterator<C> {
    config: Config,
    content: String,
    cursor: usize,
    open_tags: Vec<TagRecord>,
    pending: PendingText,
    normalizer: TextNormalizer,
    pre_depth: usize,
    head_skipped: bool,
    full_document: bool,
    callback: Option<C>,
    last_error: Option<Error>,
}

impl<C: HtmlCallback> Default for HtmlIterator<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: HtmlCallback> HtmlIterator<C> {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        HtmlIterator {
            config,
            content: String::new(),
            cursor: 0,
            open_tags: Vec::new(),
            pending: PendingText::default(),
            normalizer: TextNormalizer::default(),
            pre_depth: 0,
            head_skipped: false,
            full_document: false,
            callback: None,
            last_error: None,
        }
    }

    /* ============================ Session setup ========================== */

    /// Start a new session over `content`. All previous state is dropped.
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.restart();
    }

    /// Install the consumer. This restarts the session over the current
    /// content, so no events of an earlier session leak into the new one.
    pub fn set_callback(&mut self, callback: C) {
        self.callback = Some(callback);
        self.restart();
    }

    pub fn callback(&self) -> Option<&C> {
        self.callback.as_ref()
    }

    pub fn callback_mut(&mut self) -> Option<&mut C> {
        self.callback.as_mut()
    }

    pub fn take_callback(&mut self) -> Option<C> {
        self.callback.take()
    }

    /* =============================== Driving ============================= */

    /// Step until the end of content.
    ///
    /// Returns the fatal error that ended the session early, if any.
    /// Recoverable conditions are only reported through
    /// [`last_error`](Self::last_error).
    pub fn run(&mut self) -> Result<()> {
        let Some(mut callback) = self.callback.take() else {
            warn!("unable to iterate, callback is not set");
            self.last_error = Some(Error::NoCallback);
            return Err(Error::NoCallback);
        };
        debug!(
            len = self.content.len(),
            full_document = self.full_document,
            "iterating"
        );
        while self.step_with(&mut callback) {}
        self.callback = Some(callback);

        match &self.last_error {
            Some(err) if err.is_fatal() => Err(err.clone()),
            _ => Ok(()),
        }
    }

    /// Perform one step. Returns whether further steps are possible.
    pub fn step(&mut self) -> bool {
        let Some(mut callback) = self.callback.take() else {
            warn!("unable to step, callback is not set");
            self.last_error = Some(Error::NoCallback);
            return false;
        };
        let more = self.step_with(&mut callback);
        self.callback = Some(callback);
        more
    }

    /* ================================ Query ============================== */

    /// Whether the content starts with `<html>` or `<!doctype html>`.
    pub fn is_full_document(&self) -> bool {
        self.full_document
    }

    /// The most recent condition met in this session, fatal or not.
    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn input_len(&self) -> usize {
        self.content.len()
    }

    /// Number of currently open containers.
    pub fn depth(&self) -> usize {
        self.open_tags.len()
    }

    /* ============================== Internals ============================ */

    fn restart(&mut self) {
        self.reset_state();
        self.full_document = self.move_to_initial_position();
    }

    fn reset_state(&mut self) {
        self.cursor = 0;
        self.open_tags.clear();
        self.pending.clear();
        self.normalizer.clear();
        self.pre_depth = 0;
        self.head_skipped = false;
        self.full_document = false;
        self.last_error = None;
    }

    /// Drop the whole session after a fatal condition.
    fn abort(&mut self, err: Error) {
        error!(%err, "stopping iteration");
        self.content.clear();
        self.reset_state();
        self.last_error = Some(err);
    }

    fn recover(&mut self, err: Error) {
        debug!(%err, "recovered, continuing");
        self.last_error = Some(err);
    }

    /// Place the cursor on the first character to scan and report whether
    /// the content is a full document.
    fn move_to_initial_position(&mut self) -> bool {
        let s = self.content.as_bytes();
        let n = s.len();
        let mut i = skip_ws(s, 0);

        loop {
            if i >= n || s[i] != b'<' {
                // blank content, or a fragment starting with text
                self.cursor = i;
                return false;
            }
            match classify(s, i) {
                Sequence::Skip { end } => i = skip_ws(s, end),
                Sequence::Literal => {
                    self.cursor = i;
                    return false;
                }
                Sequence::Tag => break,
            }
        }

        self.cursor = i;
        let Ok(gt) = find_tag_end(s, i) else {
            return false;
        };
        if is_document_marker(&self.content[i + 1..gt]) {
            self.cursor = gt + 1;
            return true;
        }
        false
    }

    fn in_pre(&self) -> bool {
        self.pre_depth > 0
    }

    fn step_with(&mut self, callback: &mut C) -> bool {
        if self.cursor < self.content.len() {
            self.advance(callback);
        }
        self.cursor < self.content.len()
    }

    /// Scan text up to the next tag and handle that tag.
    fn advance(&mut self, callback: &mut C) {
        loop {
            let preserve = self.in_pre();
            let Some(lt) = find_byte(self.content.as_bytes(), b'<', self.cursor) else {
                self.pending.push_str(&self.content[self.cursor..], preserve);
                self.cursor = self.content.len();
                self.flush_text(callback, None);
                return;
            };
            self.pending.push_str(&self.content[self.cursor..lt], preserve);
            self.cursor = lt;

            match classify(self.content.as_bytes(), lt) {
                Sequence::Skip { end } => self.cursor = end,
                Sequence::Literal => {
                    self.pending.push_str("<", preserve);
                    self.cursor = lt + 1;
                }
                Sequence::Tag => {
                    self.on_tag(callback, lt);
                    return;
                }
            }
        }
    }

    fn on_tag(&mut self, callback: &mut C, lt: usize) {
        let gt = match find_tag_end(self.content.as_bytes(), lt) {
            Ok(gt) => gt,
            Err(err) => {
                self.abort(err);
                return;
            }
        };
        let mut tag = TagRecord::parse(&self.content[lt + 1..gt]);
        trace!(tag = tag.name(), closing = tag.is_closing(), offset = lt, "tag");
        if let Some(err) = tag.quoting_error() {
            self.recover(err.clone());
        }

        if self.full_document
            && self.config.skip_head
            && !self.head_skipped
            && !tag.is_closing()
            && tag.name() == "head"
        {
            self.head_skipped = true;
            // keep the runs on either side of the head apart
            if !self.pending.is_empty() {
                self.pending.push_str(" ", false);
            }
            self.cursor = match find_closing_tag(&self.content, "head", gt + 1) {
                Ok(close) => close.end + 1,
                Err(err) => {
                    self.recover(err);
                    gt + 1
                }
            };
            return;
        }

        if tag.is_closing() {
            self.leave(callback, &tag);
            self.cursor = gt + 1;
            return;
        }

        self.flush_text(callback, Some(tag.name()));

        if tag.is_self_closing() {
            callback.on_single_tag(&tag);
            self.cursor = gt + 1;
            return;
        }

        let is_script = tag.name() == "script";
        let located = if is_script {
            find_raw_closing_tag(&self.content, tag.name(), gt + 1)
        } else {
            find_closing_tag(&self.content, tag.name(), gt + 1)
        };
        let close = match located {
            Ok(close) => close,
            Err(err) => {
                // malformed markup: leave the tag unopened and keep going
                self.recover(err);
                self.cursor = gt + 1;
                return;
            }
        };
        tag.set_pair_content(gt + 1..close.start);

        if is_script {
            callback.on_script(&tag);
            self.cursor = close.end + 1;
            return;
        }

        self.enter(callback, tag, lt, gt, close);
    }

    fn enter(&mut self, callback: &mut C, tag: TagRecord, lt: usize, gt: usize, close: ClosingTag) {
        if tag.name() == "pre" {
            self.pre_depth += 1;
        }
        self.normalizer.record_entered(tag.name());

        let span = ContainerSpan {
            open_start: lt,
            open_end: gt,
            close_start: close.start,
            close_end: close.end,
        };
        let descend = callback.on_enter_container(&tag, span);
        self.open_tags.push(tag);

        // A skipped container resumes at its closing tag, which then leaves it.
        self.cursor = if descend { gt + 1 } else { close.start };
    }

    fn leave(&mut self, callback: &mut C, closing: &TagRecord) {
        let Some(open) = self.open_tags.pop() else {
            self.flush_text(callback, Some(closing.name()));
            debug!(tag = closing.name(), "ignoring stray closing tag");
            return;
        };
        self.flush_text(callback, Some(open.name()));
        callback.on_leave_container(&open);
        if open.name() == "pre" {
            self.pre_depth = self.pre_depth.saturating_sub(1);
        }
    }

    fn flush_text(&mut self, callback: &mut C, terminating: Option<&str>) {
        let pending = self.pending.take();
        let in_pre = self.in_pre();
        if let Some(text) = self.normalizer.finish(pending, terminating, in_pre) {
            trace!(text = %text, "text");
            callback.on_text(&text);
        }
    }
}

/// `html` or `!doctype html`, in any case.
fn is_document_marker(body: &str) -> bool {
    let (name, closing, name_end) = tag_name(body);
    if closing {
        return false;
    }
    if name.eq_ignore_ascii_case("html") {
        return true;
    }
    name.eq_ignore_ascii_case("!doctype")
        && trim_ws(&body[name_end..])
            .split(|c: char| c.is_ascii_whitespace())
            .next()
            .is_some_and(|word| word.eq_ignore_ascii_case("html"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Events(Vec<String>);

    impl HtmlCallback for Events {
        fn on_text(&mut self, text: &str) {
            self.0.push(format!("text:{text}"));
        }

        fn on_single_tag(&mut self, tag: &TagRecord) {
            self.0.push(format!("single:{}", tag.name()));
        }

        fn on_script(&mut self, tag: &TagRecord) {
            self.0.push(format!("script:{}", tag.name()));
        }

        fn on_enter_container(&mut self, tag: &TagRecord, _span: ContainerSpan) -> bool {
            self.0.push(format!("enter:{}", tag.name()));
            true
        }

        fn on_leave_container(&mut self, tag: &TagRecord) {
            self.0.push(format!("leave:{}", tag.name()));
        }
    }

    fn iterator(content: &str) -> HtmlIterator<Events> {
        let mut it = HtmlIterator::new();
        it.set_content(content);
        it.set_callback(Events::default());
        it
    }

    #[test]
    fn document_markers() {
        assert!(is_document_marker("html"));
        assert!(is_document_marker("HTML lang=\"en\""));
        assert!(is_document_marker("!DOCTYPE html"));
        assert!(is_document_marker("!doctype  HTML PUBLIC \"x\""));
        assert!(!is_document_marker("!doctype"));
        assert!(!is_document_marker("htmlx"));
        assert!(!is_document_marker("/html"));
    }

    #[test]
    fn initial_position_of_fragments() {
        let it = iterator("   plain <b>x</b>");
        assert!(!it.is_full_document());
        assert_eq!(it.cursor(), 3);

        let it = iterator("\n<div>x</div>");
        assert!(!it.is_full_document());
        assert_eq!(it.cursor(), 1);

        let it = iterator("<!-- c --> <div>x</div>");
        assert!(!it.is_full_document());
        assert_eq!(it.cursor(), 11);
    }

    #[test]
    fn initial_position_of_documents() {
        let it = iterator("<html><body>x</body></html>");
        assert!(it.is_full_document());
        assert_eq!(it.cursor(), 6);

        let it = iterator("  <!DocType html>\n<html></html>");
        assert!(it.is_full_document());
        assert_eq!(it.cursor(), 17);
    }

    #[test]
    fn blank_content_has_no_steps() {
        let mut it = iterator(" \n\t ");
        assert_eq!(it.cursor(), it.input_len());
        assert!(!it.step());
        it.run().unwrap();
        assert!(it.callback().unwrap().0.is_empty());
    }

    #[test]
    fn step_without_callback() {
        let mut it: HtmlIterator<Events> = HtmlIterator::new();
        it.set_content("<p>x</p>");
        assert!(!it.step());
        assert_eq!(it.last_error(), Some(&Error::NoCallback));
        assert_eq!(it.run(), Err(Error::NoCallback));
    }

    #[test]
    fn depth_follows_open_containers() {
        let mut it = iterator("<div><p>x</p></div>");
        assert!(it.step());
        assert_eq!(it.depth(), 1);
        assert!(it.step());
        assert_eq!(it.depth(), 2);
        assert!(it.step());
        assert_eq!(it.depth(), 1);
        assert!(!it.step());
        assert_eq!(it.depth(), 0);
        assert_eq!(
            it.callback().unwrap().0,
            ["enter:div", "enter:p", "text:x", "leave:p", "leave:div"]
        );
    }

    #[test]
    fn missing_terminator_clears_session() {
        let mut it = iterator("<p>a</p> b <i");
        let err = it.run().unwrap_err();
        assert_eq!(err, Error::MissingTagTerminator { offset: 11 });
        assert_eq!(it.input_len(), 0);
        assert_eq!(it.depth(), 0);
        assert!(!it.step());
        assert_eq!(it.callback().unwrap().0, ["enter:p", "text:a", "leave:p"]);
    }

    #[test]
    fn unmatched_container_is_recorded() {
        let mut it = iterator("<div>text");
        it.run().unwrap();
        assert_eq!(
            it.last_error(),
            Some(&Error::UnmatchedClosingTag {
                name: "div".into(),
                offset: 5
            })
        );
        assert_eq!(it.callback().unwrap().0, ["text:text"]);
    }

    #[test]
    fn literal_less_than() {
        let mut it = iterator("<p>1 < 2</p>");
        it.run().unwrap();
        assert_eq!(it.callback().unwrap().0, ["enter:p", "text:1 < 2", "leave:p"]);
    }

    #[test]
    fn pre_depth_is_restored() {
        let mut it = iterator("<pre> a  b </pre><p> c  d </p>");
        it.run().unwrap();
        assert_eq!(
            it.callback().unwrap().0,
            [
                "enter:pre",
                "text: a  b ",
                "leave:pre",
                "enter:p",
                "text:c d ",
                "leave:p"
            ]
        );
        assert!(!it.in_pre());
    }
}
