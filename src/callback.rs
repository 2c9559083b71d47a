// src/callback.rs
//
// The consumer side of the iterator.

use tracing::debug;

use crate::tag::TagRecord;

/// Byte offsets of a container's delimiters. `open_start`/`close_start`
/// point at the `<`, `open_end`/`close_end` at the `>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContainerSpan {
    pub open_start: usize,
    pub open_end: usize,
    pub close_start: usize,
    pub close_end: usize,
}

/// Receives iteration events in document order.
///
/// The iterator treats the callback as a sink; the only decision it takes
/// from it is whether to descend into a container.
pub trait HtmlCallback {
    /// A normalized, non-empty text run.
    fn on_text(&mut self, text: &str);

    /// A void or self-closing tag.
    fn on_single_tag(&mut self, tag: &TagRecord);

    /// A `<script>` element. Its body is not tokenized; the content range
    /// is available through [`TagRecord::pair_content`].
    fn on_script(&mut self, tag: &TagRecord);

    /// A container was opened and its closing tag located. Return `false`
    /// to skip its content; [`on_leave_container`](Self::on_leave_container)
    /// still fires for it.
    fn on_enter_container(&mut self, tag: &TagRecord, span: ContainerSpan) -> bool;

    /// A previously entered container is closed.
    fn on_leave_container(&mut self, tag: &TagRecord);
}

impl<T: HtmlCallback + ?Sized> HtmlCallback for &mut T {
    fn on_text(&mut self, text: &str) {
        (**self).on_text(text)
    }

    fn on_single_tag(&mut self, tag: &TagRecord) {
        (**self).on_single_tag(tag)
    }

    fn on_script(&mut self, tag: &TagRecord) {
        (**self).on_script(tag)
    }

    fn on_enter_container(&mut self, tag: &TagRecord, span: ContainerSpan) -> bool {
        (**self).on_enter_container(tag, span)
    }

    fn on_leave_container(&mut self, tag: &TagRecord) {
        (**self).on_leave_container(tag)
    }
}

impl<T: HtmlCallback + ?Sized> HtmlCallback for Box<T> {
    fn on_text(&mut self, text: &str) {
        (**self).on_text(text)
    }

    fn on_single_tag(&mut self, tag: &TagRecord) {
        (**self).on_single_tag(tag)
    }

    fn on_script(&mut self, tag: &TagRecord) {
        (**self).on_script(tag)
    }

    fn on_enter_container(&mut self, tag: &TagRecord, span: ContainerSpan) -> bool {
        (**self).on_enter_container(tag, span)
    }

    fn on_leave_container(&mut self, tag: &TagRecord) {
        (**self).on_leave_container(tag)
    }
}

/// Logs every event at debug level and descends into every container.
#[derive(Clone, Copy, Debug, Default)]
pub struct DebugLogCallback;

impl HtmlCallback for DebugLogCallback {
    fn on_text(&mut self, text: &str) {
        debug!(text, "on_text");
    }

    fn on_single_tag(&mut self, tag: &TagRecord) {
        debug!(tag = tag.name(), "on_single_tag");
    }

    fn on_script(&mut self, tag: &TagRecord) {
        debug!(tag = tag.name(), content = ?tag.pair_content(), "on_script");
    }

    fn on_enter_container(&mut self, tag: &TagRecord, span: ContainerSpan) -> bool {
        debug!(tag = tag.name(), ?span, "on_enter_container");
        true
    }

    fn on_leave_container(&mut self, tag: &TagRecord) {
        debug!(tag = tag.name(), "on_leave_container");
    }
}
