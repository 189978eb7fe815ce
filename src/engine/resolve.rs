//! Capture resolution.
//!
//! The matcher only produces raw `(field, text)` captures. Resolution turns them into the output
//! field set in two phases:
//!
//! ```text
//! phase 1  Normal  -> output[key] = text, known[key] = text
//!          Skip    -> known[key] = text            (never output)
//!          Append  -> buffered per key, in encounter order
//!          Indirect-> held until phase 2
//!
//! phase 2  Append  -> join buffer (by ordinal if any), onto output[key] or the record's value
//!          Indirect-> output[known[key] or record[key]] = text, dropped if neither exists
//! ```
//!
//! All lookups go through the transient `known` map; nothing is dispatched by field name at
//! runtime. The buffers live for exactly one call.

use super::field::FieldKind;
use super::matcher::Capture;
use crate::record::{Record, Value};
use std::collections::HashMap;

/// The output of one successful dissection: extracted keys and their text.
///
/// Nothing here has touched a record yet. [`Dissection::commit`] writes all of it at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dissection {
    fields: Vec<(String, String)>,
}

impl Dissection {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Output fields in commit order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Write every extracted field into `record` as text.
    pub fn commit<R: Record + ?Sized>(self, record: &mut R) {
        for (key, value) in self.fields {
            record.set(&key, Value::Text(value));
        }
    }

    fn upsert(&mut self, key: &str, value: String) {
        match self.fields.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value,
            None => self.fields.push((key.to_string(), value)),
        }
    }
}

#[derive(Debug)]
struct AppendEntry<'a> {
    ordinal: Option<u32>,
    text: &'a str,
    preceding: Option<&'a str>,
}

/// Values collected for one append key during a single pass.
#[derive(Debug)]
struct AppendBuffer<'a> {
    key: &'a str,
    entries: Vec<AppendEntry<'a>>,
}

impl AppendBuffer<'_> {
    /// Join the buffered values onto `base`.
    ///
    /// With any ordinal present the entries are ordered by it (missing ordinals count as 0, ties keep
    /// encounter order). Every value after the first is prefixed by its preceding delimiter, or a
    /// single space when the field had none.
    fn join(mut self, base: Option<String>) -> String {
        if self.entries.iter().any(|e| e.ordinal.is_some()) {
            self.entries.sort_by_key(|e| e.ordinal.unwrap_or(0));
        }

        let mut joined = base;
        for entry in self.entries {
            match joined.as_mut() {
                None => joined = Some(entry.text.to_string()),
                Some(acc) => {
                    acc.push_str(entry.preceding.unwrap_or(" "));
                    acc.push_str(entry.text);
                }
            }
        }
        joined.unwrap_or_default()
    }
}

/// Resolve captures from one scan into the output field set.
///
/// `existing` is the record being dissected; it is consulted (never modified) when an append key has
/// no same-pass base or an indirect key was not captured in this pass.
pub(crate) fn resolve(captures: &[Capture<'_, '_>], existing: &dyn Record) -> Dissection {
    let mut out = Dissection::default();
    let mut known: HashMap<&str, String> = HashMap::new();
    let mut buffers: Vec<AppendBuffer<'_>> = Vec::new();
    let mut indirect: Vec<&Capture<'_, '_>> = Vec::new();

    for capture in captures {
        let key = capture.field.key.as_str();
        match capture.field.kind {
            FieldKind::Normal => {
                out.upsert(key, capture.value.to_string());
                known.insert(key, capture.value.to_string());
            }
            FieldKind::Skip => {
                if !capture.field.is_anonymous() {
                    known.insert(key, capture.value.to_string());
                }
            }
            FieldKind::Append => {
                let entry =
                    AppendEntry { ordinal: capture.field.ordinal, text: capture.value, preceding: capture.preceding };
                match buffers.iter_mut().find(|b| b.key == key) {
                    Some(buffer) => buffer.entries.push(entry),
                    None => buffers.push(AppendBuffer { key, entries: vec![entry] }),
                }
            }
            FieldKind::Indirect => indirect.push(capture),
        }
    }

    for buffer in buffers {
        let key = buffer.key;
        let base = out.get(key).map(str::to_string).or_else(|| existing_text(existing, key));
        let joined = buffer.join(base);
        known.insert(key, joined.clone());
        out.upsert(key, joined);
    }

    for capture in indirect {
        let key = capture.field.key.as_str();
        match known.get(key).cloned().or_else(|| existing_text(existing, key)) {
            Some(target) if !target.is_empty() => out.upsert(&target, capture.value.to_string()),
            _ => tracing::debug!(field = key, value = capture.value, "indirect field dropped, its key has no value"),
        }
    }

    out
}

fn existing_text(record: &dyn Record, key: &str) -> Option<String> {
    record.get(key).and_then(Value::as_text).map(|text| text.into_owned())
}
