//! Error taxonomy.
//!
//! Two families of errors exist and they never mix:
//!
//! - [`ConfigError`]: raised while building a [`Dissector`](crate::Dissector). These are fatal; an engine
//!   with a bad pattern or conversion type never starts.
//! - [`DissectFailure`]: the reason a single mapping entry did not match a single record. These are
//!   recoverable; the caller tags the record and moves on.

use thiserror::Error;

/// Setup-time errors. Any of these prevents the engine from being constructed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A `%{...}` placeholder could not be turned into a field.
    #[error("invalid field format `{field}`: {reason}")]
    InvalidFieldFormat { field: String, reason: FieldFormatError },

    /// `convert_datatype` named something other than `int` or `float`.
    #[error("unsupported datatype `{datatype}` for field `{field}`, expected `int` or `float`")]
    ConvertDatatypeFormat { field: String, datatype: String },

    /// The pattern string was empty.
    #[error("the pattern string cannot be empty")]
    EmptyPattern,

    /// The configuration document itself was malformed.
    #[error("invalid configuration: {0}")]
    Parse(String),
}

/// Why a single placeholder was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldFormatError {
    #[error("field cannot prefix with both Append and Indirect prefix ({prefixes})")]
    MixedPrefixes { prefixes: &'static str },

    #[error("field cannot be a prefix on its own without further text")]
    PrefixWithoutName,

    #[error("field cannot be a prefix and a suffix without a name section")]
    OrdinalWithoutName,

    #[error("ordinal suffix `{ordinal}` is not a non-negative integer")]
    InvalidOrdinal { ordinal: String },

    #[error("placeholder is not terminated by `}}`")]
    Unterminated,
}

impl ConfigError {
    pub(crate) fn field_format(field: impl Into<String>, reason: FieldFormatError) -> Self {
        ConfigError::InvalidFieldFormat { field: field.into(), reason }
    }
}

/// Why one mapping entry produced nothing for one record.
///
/// A failed entry commits no fields at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DissectFailure {
    #[error("delimiter `{delimiter}` not found in input")]
    DelimiterNotFound { delimiter: String },

    #[error("source value is empty")]
    EmptyInput,

    #[error("source field `{field}` not found")]
    SourceFieldMissing { field: String },

    #[error("source field `{field}` does not hold text")]
    SourceNotText { field: String },
}

/// Convenience alias for setup results.
pub type Result<T> = std::result::Result<T, ConfigError>;
