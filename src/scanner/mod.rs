//! Lexical scanners for non-XML content
//!
//! Each scanner is a small state machine over raw text (or bytes) that yields
//! the spans worth resolving: URL-ish attribute values, string literals,
//! `R.type.name` accesses. They do not know about the registry; the usage
//! model resolves what they yield.

pub mod binary;
pub mod css;
pub mod html;
pub mod js;
pub mod source;

pub use binary::MarkerScanner;
pub use css::CssScanner;
pub use html::{HtmlScanner, WebToken};
pub use js::JsScanner;
pub use source::{SourceScanner, SourceToken};

use std::collections::BTreeSet;

/// Receives string values that no scanner could resolve to a resource
///
/// Safe-mode heuristics hang off this: a string such as `"ic_" + name` built
/// at runtime may still name a resource.
pub trait StringLiteralHook {
    fn on_unresolved_string_literal(&mut self, _value: &str) {}
}

/// Hook that ignores everything
#[derive(Debug, Default)]
pub struct NoopHook;

impl StringLiteralHook for NoopHook {}

/// Hook that collects every distinct unresolved string
#[derive(Debug, Default)]
pub struct StringPool {
    strings: BTreeSet<String>,
}

impl StringPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strings(&self) -> impl Iterator<Item = &str> {
        self.strings.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

impl StringLiteralHook for StringPool {
    fn on_unresolved_string_literal(&mut self, value: &str) {
        if !value.is_empty() {
            self.strings.insert(value.to_string());
        }
    }
}

/// Guard against state machines that stop advancing
///
/// If the offset is the same on two consecutive iterations it is forcibly
/// moved forward by one.
#[derive(Debug, Default)]
pub(crate) struct Progress {
    last: Option<usize>,
}

impl Progress {
    pub(crate) fn check(&mut self, offset: usize) -> usize {
        let offset = match self.last {
            Some(last) if last == offset => offset + 1,
            _ => offset,
        };
        self.last = Some(offset);
        offset
    }
}

/// Whether `c` can be part of a Java/Kotlin identifier
pub(crate) fn is_identifier_part(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_' || c == b'$'
}

/// ASCII case-insensitive search for `needle` in `haystack[from..]`
pub(crate) fn find_ignore_case(haystack: &str, from: usize, needle: &str) -> Option<usize> {
    let hay = haystack.as_bytes();
    let needle = needle.as_bytes();
    if from > hay.len() || needle.is_empty() {
        return None;
    }
    hay[from..]
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
        .map(|pos| from + pos)
}
