//! Configuration surface.
//!
//! The engine is configured with three things: an ordered mapping of source field to pattern, the tags
//! to add on failure, and an ordered set of datatype conversions. The JSON form is:
//!
//! ```json
//! {
//!   "mapping": { "message": "%{ts} %{+ts} %{host} %{msg}" },
//!   "tag_on_failure": ["_dissectfailure"],
//!   "convert_datatype": { "code": "int" },
//!   "repeated_delimiters": "collapse"
//! }
//! ```
//!
//! Declaration order of `mapping` and `convert_datatype` is preserved; later mapping entries may read
//! fields produced by earlier ones.

use crate::engine::RepeatedDelimiters;
use crate::error::ConfigError;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;

/// Tag added to a record when a mapping entry fails, unless configured otherwise.
pub const DEFAULT_FAILURE_TAG: &str = "_dissectfailure";

fn default_tag_on_failure() -> Vec<String> {
    vec![DEFAULT_FAILURE_TAG.to_string()]
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DissectConfig {
    /// `(source field, pattern)` pairs, applied in order.
    #[serde(default, deserialize_with = "ordered_pairs")]
    pub mapping: Vec<(String, String)>,
    #[serde(default = "default_tag_on_failure")]
    pub tag_on_failure: Vec<String>,
    /// `(field, "int" | "float")` pairs, applied in order after all mapping entries.
    #[serde(default, deserialize_with = "ordered_pairs")]
    pub convert_datatype: Vec<(String, String)>,
    #[serde(default)]
    pub repeated_delimiters: RepeatedDelimiters,
}

impl Default for DissectConfig {
    fn default() -> Self {
        DissectConfig {
            mapping: Vec::new(),
            tag_on_failure: default_tag_on_failure(),
            convert_datatype: Vec::new(),
            repeated_delimiters: RepeatedDelimiters::default(),
        }
    }
}

impl DissectConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON configuration document.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    pub fn with_mapping(mut self, source: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.mapping.push((source.into(), pattern.into()));
        self
    }

    pub fn with_conversion(mut self, field: impl Into<String>, datatype: impl Into<String>) -> Self {
        self.convert_datatype.push((field.into(), datatype.into()));
        self
    }

    pub fn with_tag_on_failure<T: Into<String>>(mut self, tags: impl IntoIterator<Item = T>) -> Self {
        self.tag_on_failure = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_repeated_delimiters(mut self, policy: RepeatedDelimiters) -> Self {
        self.repeated_delimiters = policy;
        self
    }
}

/// Deserialize a JSON object into `(key, value)` pairs in document order.
fn ordered_pairs<'de, D>(deserializer: D) -> Result<Vec<(String, String)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct PairsVisitor;

    impl<'de> Visitor<'de> for PairsVisitor {
        type Value = Vec<(String, String)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of field names to strings")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut pairs = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((key, value)) = access.next_entry::<String, String>()? {
                pairs.push((key, value));
            }
            Ok(pairs)
        }
    }

    deserializer.deserialize_map(PairsVisitor)
}
