//! Delimiter location.
//!
//! Each delimiter picks a search strategy once, when the pattern is compiled:
//!
//! ```text
//! len 0  -> never found (two fields with nothing between them cannot be split)
//! len 1  -> memchr over the haystack bytes
//! len 2+ -> prebuilt memmem finder
//! ```
//!
//! Searching is done on bytes. Because delimiters are complete UTF-8 strings and the cursor always
//! sits on a char boundary, every match position is a char boundary too.

use memchr::memmem;

#[derive(Clone)]
enum Locator {
    Empty,
    Byte(u8),
    Bytes(memmem::Finder<'static>),
}

/// A literal run of text between two placeholders.
#[derive(Clone)]
pub struct Delimiter {
    text: String,
    locator: Locator,
    /// Collapse immediately repeated occurrences into one.
    collapse: bool,
}

impl Delimiter {
    pub(crate) fn new(text: &str, collapse: bool) -> Self {
        let locator = match text.as_bytes() {
            [] => Locator::Empty,
            [b] => Locator::Byte(*b),
            bytes => Locator::Bytes(memmem::Finder::new(bytes).into_owned()),
        };
        Delimiter { text: text.to_string(), locator, collapse }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn collapses_repeats(&self) -> bool {
        self.collapse
    }

    /// Byte offset of the first occurrence at or after `from`.
    pub fn find(&self, haystack: &str, from: usize) -> Option<usize> {
        let tail = haystack.as_bytes().get(from..)?;
        let found = match &self.locator {
            Locator::Empty => None,
            Locator::Byte(b) => memchr::memchr(*b, tail),
            Locator::Bytes(finder) => finder.find(tail),
        };
        found.map(|pos| from + pos)
    }

    /// Advance `cursor` past any back-to-back repeats of this delimiter.
    ///
    /// Only applies when collapsing is enabled; otherwise `cursor` is returned unchanged.
    pub fn skip_repeats(&self, haystack: &str, mut cursor: usize) -> usize {
        if !self.collapse || self.text.is_empty() {
            return cursor;
        }
        while haystack.as_bytes().get(cursor..).is_some_and(|tail| tail.starts_with(self.text.as_bytes())) {
            cursor += self.text.len();
        }
        cursor
    }
}

impl std::fmt::Debug for Delimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Delimiter").field("text", &self.text).field("collapse", &self.collapse).finish()
    }
}

impl PartialEq for Delimiter {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text && self.collapse == other.collapse
    }
}

impl Eq for Delimiter {}
