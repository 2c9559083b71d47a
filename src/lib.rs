//! # htmliter
//!
//! Single-pass, streaming HTML iterator. The content is walked once, left to
//! right, and structural events are delivered to an [`HtmlCallback`]: text
//! runs, single tags, container enter/leave and script elements. No tree is
//! built.
//!
//! The iterator is lenient: unclosed containers are skipped, malformed
//! attributes are dropped, and only a `<` with no `>` anywhere after it
//! stops a session. It is meant for rendering HTML-styled text, not for
//! standards-complete parsing.
//!
//! A session is driven either with [`HtmlIterator::run`] or one
//! [`HtmlIterator::step`] at a time; all state lives in the iterator, so
//! the host can interleave other work between steps.

pub mod callback;
pub mod config;
pub mod error;
pub mod iterator;
mod matcher;
mod scan;
pub mod tag;
mod text;

pub use callback::{ContainerSpan, DebugLogCallback, HtmlCallback};
pub use config::Config;
pub use error::{Error, Result};
pub use iterator::HtmlIterator;
pub use tag::{is_inline, is_void, TagRecord};
pub use text::collapse_whitespace;
