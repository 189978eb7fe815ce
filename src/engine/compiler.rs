//! Pattern compilation.
//!
//! This is the *static* side of the engine: a pattern string is compiled once into an immutable
//! [`Pattern`] and then shared, read-only, by every dissection that uses it.
//!
//! ```text
//! "[%{ts}] %{+msg/2} %{?x}"
//!   │  │  │    │      │  │
//!   │  │  │    │      │  └─ Field(?x)
//!   │  │  │    │      └─ Delimiter(" ")
//!   │  │  │    └─ Field(+msg/2)
//!   │  │  └─ Delimiter("] ")
//!   │  └─ Field(ts)
//!   └─ Delimiter("[")
//! ```
//!
//! ## Invariants
//!
//! - Two delimiters are never adjacent: literal text between two placeholders is one segment.
//! - Delimiter text never contains a complete `%{`...`}` placeholder.
//! - A delimiter's collapse flag is fixed here, from the compile options and the `->` suffix of the
//!   field in front of it. The matcher does not look at field suffixes.

use super::field::FieldSpec;
use super::search::Delimiter;
use crate::error::{ConfigError, FieldFormatError};
use serde::Deserialize;

/// Policy for back-to-back repeats of a delimiter in the input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatedDelimiters {
    /// Every delimiter swallows its immediate repeats, so column padding never yields empty fields.
    #[default]
    Collapse,
    /// Only delimiters after a `->` field collapse. Repeats elsewhere delimit empty fields.
    Preserve,
}

/// Options fixed at compile time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    pub repeated_delimiters: RepeatedDelimiters,
}

/// One element of a compiled pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Delimiter(Delimiter),
    Field(FieldSpec),
}

/// A compiled dissect pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    segments: Vec<Segment>,
}

impl Pattern {
    /// Compile `text` with default options.
    ///
    /// # Example
    /// ```
    /// use dissector::Pattern;
    ///
    /// let pattern = Pattern::compile("%{a} %{b}").unwrap();
    /// assert_eq!(pattern.fields().count(), 2);
    /// ```
    pub fn compile(text: &str) -> Result<Self, ConfigError> {
        Self::compile_with(text, CompileOptions::default())
    }

    pub fn compile_with(text: &str, options: CompileOptions) -> Result<Self, ConfigError> {
        if text.is_empty() {
            return Err(ConfigError::EmptyPattern);
        }

        let collapse_all = options.repeated_delimiters == RepeatedDelimiters::Collapse;
        let mut segments = Vec::new();
        let mut tail = 0;

        for caps in crate::regex!(r"%\{(.*?)\}").captures_iter(text) {
            let (Some(whole), Some(body)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if body.as_str().contains("%{") {
                return Err(ConfigError::field_format(body.as_str(), FieldFormatError::Unterminated));
            }

            push_delimiter(&mut segments, &text[tail..whole.start()], collapse_all);
            segments.push(Segment::Field(FieldSpec::parse(body.as_str())?));
            tail = whole.end();
        }

        let rest = &text[tail..];
        if let Some(open) = rest.find("%{") {
            return Err(ConfigError::field_format(&rest[open..], FieldFormatError::Unterminated));
        }
        push_delimiter(&mut segments, rest, collapse_all);

        tracing::trace!(pattern = text, segments = segments.len(), "compiled dissect pattern");
        Ok(Pattern { source: text.to_string(), segments })
    }

    /// The pattern string this was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Field specs in pattern order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Field(f) => Some(f),
            Segment::Delimiter(_) => None,
        })
    }
}

fn push_delimiter(segments: &mut Vec<Segment>, literal: &str, collapse_all: bool) {
    if literal.is_empty() {
        return;
    }
    let after_padded_field = matches!(segments.last(), Some(Segment::Field(f)) if f.right_padded);
    segments.push(Segment::Delimiter(Delimiter::new(literal, collapse_all || after_padded_field)));
}
