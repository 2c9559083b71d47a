// src/error.rs
//
// Error conditions reported by the iterator.
//
// Only `MissingTagTerminator` ends a session. The other conditions are
// absorbed where they occur and are visible to the host through
// `HtmlIterator::last_error` and the `tracing` output.

use thiserror::Error;

/// Errors that can occur while iterating HTML content.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A `<` opened a tag but no `>` follows it anywhere in the input.
    #[error("no '>' terminates the tag opened at offset {offset}")]
    MissingTagTerminator { offset: usize },

    /// The closing tag of a container could not be located.
    #[error("no closing tag found for <{name}> searched from offset {offset}")]
    UnmatchedClosingTag { name: String, offset: usize },

    /// An attribute value opened a quote that is never closed.
    #[error("attribute `{name}` has an unterminated {quote} quoted value")]
    MalformedAttributeQuoting { name: String, quote: char },

    /// Iteration was driven before a callback was installed.
    #[error("no callback is set, nothing to deliver events to")]
    NoCallback,
}

impl Error {
    /// Whether this condition ends the current session.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::MissingTagTerminator { .. } | Error::NoCallback)
    }
}

/// Result type for iterator operations.
pub type Result<T> = std::result::Result<T, Error>;
