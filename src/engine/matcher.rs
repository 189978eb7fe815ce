//! Single-pass matching.
//!
//! The matcher walks a compiled [`Pattern`] left to right with one cursor into the input. It never
//! looks further ahead than the next literal delimiter and never moves the cursor backwards, so a
//! dissection is `O(len(input))` and either yields one capture per field or fails outright.
//!
//! ```text
//! pattern: Field(a)  Delim(" ")  Field(b)  Delim(" ")  Field(c)
//! input:   "00000043 ViewReceiver  I"
//!           ^cursor
//!
//! Field(a) + Delim(" ")  -> find " " at 8     -> a = input[0..8], cursor = 9
//! Field(b) + Delim(" ")  -> find " " at 21    -> b = input[9..21], cursor = 22
//!                           repeat at 22      -> cursor = 23 (collapsed)
//! Field(c) (last)        -> remainder         -> c = input[23..]
//! ```
//!
//! Captures borrow from both the pattern and the input. Turning them into output fields is the
//! resolver's job (`resolve.rs`).

use super::compiler::{Pattern, Segment};
use super::field::FieldSpec;
use super::resolve::{Dissection, resolve};
use super::search::Delimiter;
use crate::error::DissectFailure;
use crate::record::{Event, Record};

/// The raw text captured for one field during a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Capture<'p, 'i> {
    pub field: &'p FieldSpec,
    pub value: &'i str,
    /// Delimiter text directly in front of the field in the pattern, if any.
    pub preceding: Option<&'p str>,
}

/// Scan `input` against `pattern`, producing one capture per field in pattern order.
pub(crate) fn scan<'p, 'i>(pattern: &'p Pattern, input: &'i str) -> Result<Vec<Capture<'p, 'i>>, DissectFailure> {
    if input.is_empty() {
        return Err(DissectFailure::EmptyInput);
    }

    let segments = pattern.segments();
    let mut captures = Vec::with_capacity(segments.len() / 2 + 1);
    let mut cursor = 0;
    let mut idx = 0;

    while idx < segments.len() {
        match &segments[idx] {
            // Only a leading delimiter (or a pattern without fields) gets here: a delimiter that
            // follows a field is consumed together with that field below. It is anchored at the start.
            Segment::Delimiter(delim) => {
                if input[cursor..].starts_with(delim.as_str()) {
                    cursor = delim.skip_repeats(input, cursor + delim.len());
                } else if idx + 1 == segments.len() {
                    cursor = input.len();
                } else {
                    return Err(not_found(delim));
                }
                idx += 1;
            }
            Segment::Field(field) => {
                let preceding = match idx.checked_sub(1).map(|i| &segments[i]) {
                    Some(Segment::Delimiter(d)) => Some(d.as_str()),
                    _ => None,
                };

                let value = match segments.get(idx + 1) {
                    None => {
                        let value = &input[cursor..];
                        cursor = input.len();
                        idx += 1;
                        value
                    }
                    Some(Segment::Field(_)) => {
                        return Err(DissectFailure::DelimiterNotFound { delimiter: String::new() });
                    }
                    Some(Segment::Delimiter(delim)) => {
                        let trailing = idx + 2 == segments.len();
                        let value = match delim.find(input, cursor) {
                            Some(pos) => {
                                let value = &input[cursor..pos];
                                cursor = delim.skip_repeats(input, pos + delim.len());
                                value
                            }
                            // A missing trailing delimiter leaves the rest of the input to the field.
                            None if trailing => {
                                let value = &input[cursor..];
                                cursor = input.len();
                                value
                            }
                            None => return Err(not_found(delim)),
                        };
                        idx += 2;
                        value
                    }
                };

                tracing::trace!(key = %field.key, kind = ?field.kind, value, cursor, "captured field");
                captures.push(Capture { field, value, preceding });
            }
        }
    }

    Ok(captures)
}

fn not_found(delim: &Delimiter) -> DissectFailure {
    DissectFailure::DelimiterNotFound { delimiter: delim.as_str().to_string() }
}

impl Pattern {
    /// Dissect `input` on its own, with no surrounding record.
    ///
    /// # Example
    /// ```
    /// use dissector::Pattern;
    ///
    /// let pattern = Pattern::compile("%{a} %{b} %{+a}").unwrap();
    /// let out = pattern.dissect("1 2 3 go").unwrap();
    /// assert_eq!(out.get("a"), Some("1 3 go"));
    /// assert_eq!(out.get("b"), Some("2"));
    /// ```
    pub fn dissect(&self, input: &str) -> Result<Dissection, DissectFailure> {
        self.dissect_with(input, &Event::new())
    }

    /// Dissect `input`, letting append and indirect fields fall back to values already in `existing`.
    ///
    /// `existing` is only read. Nothing is written until the caller commits the returned
    /// [`Dissection`].
    pub fn dissect_with(&self, input: &str, existing: &dyn Record) -> Result<Dissection, DissectFailure> {
        let captures = scan(self, input)?;
        Ok(resolve(&captures, existing))
    }
}
