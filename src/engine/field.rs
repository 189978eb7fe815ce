//! Field model.
//!
//! A placeholder `%{...}` becomes a [`FieldSpec`]. The text inside the braces is read as:
//!
//! ```text
//! %{ [prefix] key [/ordinal] [->] }
//!     │        │    │          └─ collapse repeats of the following delimiter
//!     │        │    └─ append position (append fields only)
//!     │        └─ possibly empty
//!     └─ `?` skip, `+` append, `&` indirect
//! ```
//!
//! Prefix characters are first collected into a [`Modifiers`] set and only then classified, so a
//! forbidden combination such as `+&` is caught by one exhaustive match instead of by ordering rules.

use crate::error::{ConfigError, FieldFormatError};

bitflags::bitflags! {
    /// Prefix modifiers read from the start of a placeholder.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub(crate) struct Modifiers: u8 {
        const SKIP     = 1 << 0;
        const APPEND   = 1 << 1;
        const INDIRECT = 1 << 2;
    }
}

/// Suffix requesting that repeats of the following delimiter collapse into one.
pub(crate) const RIGHT_PADDING_SUFFIX: &str = "->";

/// How a captured value is disposed of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Committed under its key.
    Normal,
    /// Kept only for indirect lookups; never committed.
    Skip,
    /// Joined with every other append value sharing its key.
    Append,
    /// Committed under the value previously captured for its key.
    Indirect,
}

/// A parsed placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: String,
    pub kind: FieldKind,
    /// Append position. Always `None` for other kinds.
    pub ordinal: Option<u32>,
    /// Set by the `->` suffix.
    pub right_padded: bool,
}

impl FieldSpec {
    /// Parse the text between `%{` and `}`.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let (body, right_padded) = match raw.strip_suffix(RIGHT_PADDING_SUFFIX) {
            Some(body) => (body, true),
            None => (raw, false),
        };

        let (modifiers, rest) = read_modifiers(body);

        let (kind, key, ordinal) = match modifiers {
            m if m == Modifiers::APPEND | Modifiers::INDIRECT => {
                let prefixes = if body.starts_with('+') { "+&" } else { "&+" };
                return Err(ConfigError::field_format(raw, FieldFormatError::MixedPrefixes { prefixes }));
            }
            m if m == Modifiers::APPEND => {
                let (key, ordinal) = split_ordinal(raw, rest)?;
                (FieldKind::Append, key, ordinal)
            }
            m if m == Modifiers::INDIRECT => {
                if rest.is_empty() {
                    return Err(ConfigError::field_format(raw, FieldFormatError::PrefixWithoutName));
                }
                (FieldKind::Indirect, rest, None)
            }
            m if m == Modifiers::SKIP => (FieldKind::Skip, rest, None),
            _ if rest.is_empty() => (FieldKind::Skip, rest, None),
            _ => (FieldKind::Normal, rest, None),
        };

        Ok(FieldSpec { key: key.to_string(), kind, ordinal, right_padded })
    }

    /// True for the unnamed `%{}` / `%{?}` placeholder.
    pub fn is_anonymous(&self) -> bool {
        self.key.is_empty()
    }

    /// True when the value ends up in the output under some key.
    pub fn is_saveable(&self) -> bool {
        self.kind != FieldKind::Skip
    }
}

/// Collect at most one `?`, or up to two distinct `+`/`&`, from the front of `body`.
fn read_modifiers(body: &str) -> (Modifiers, &str) {
    let flag = |c: char| match c {
        '?' => Some(Modifiers::SKIP),
        '+' => Some(Modifiers::APPEND),
        '&' => Some(Modifiers::INDIRECT),
        _ => None,
    };

    let mut chars = body.chars();
    let Some(first) = chars.next().and_then(flag) else {
        return (Modifiers::empty(), body);
    };
    let rest = &body[1..];
    if first == Modifiers::SKIP {
        return (first, rest);
    }

    match rest.chars().next().and_then(flag) {
        Some(second) if second != first && second != Modifiers::SKIP => (first | second, &rest[1..]),
        _ => (first, rest),
    }
}

fn split_ordinal<'a>(raw: &str, rest: &'a str) -> Result<(&'a str, Option<u32>), ConfigError> {
    match rest.split_once('/') {
        None if rest.is_empty() => Err(ConfigError::field_format(raw, FieldFormatError::PrefixWithoutName)),
        None => Ok((rest, None)),
        Some(("", _)) => Err(ConfigError::field_format(raw, FieldFormatError::OrdinalWithoutName)),
        Some((key, ordinal)) => match ordinal.parse::<u32>() {
            Ok(n) => Ok((key, Some(n))),
            Err(_) => Err(ConfigError::field_format(
                raw,
                FieldFormatError::InvalidOrdinal { ordinal: ordinal.to_string() },
            )),
        },
    }
}
