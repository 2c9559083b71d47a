// src/config.rs
//
// Iterator options.

/// Options fixed for the lifetime of an [`HtmlIterator`](crate::HtmlIterator).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// In full documents, jump over the first `<head>…</head>` without
    /// reporting anything inside it.
    pub skip_head: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self { skip_head: true }
    }
}
