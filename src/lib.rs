//! Dissect-style field extraction.
//!
//! A pattern such as `%{ts} %{+ts} %{host} %{?key}=%{&key}` describes a line as named fields
//! separated by literal delimiters. Patterns are compiled once, then applied to any number of
//! records: the source field is split in a single left-to-right pass, append and indirect fields are
//! resolved, and the results are written back onto the record. Optional `int` / `float` conversions
//! run afterwards.
//!
//! ```
//! use dissector::{DissectConfig, Dissector, Event, NoopMetrics, Record};
//!
//! let config = DissectConfig::new()
//!     .with_mapping("message", "%{ts} %{+ts} %{level} %{?key}=%{&key}")
//!     .with_conversion("code", "int");
//! let dissector = Dissector::new(&config).unwrap();
//!
//! let mut event = Event::with_fields([("message", "Mar 16 WARN code=42")]);
//! dissector.dissect(&mut event, &NoopMetrics);
//!
//! assert_eq!(event.text("ts"), Some("Mar 16"));
//! assert_eq!(event.text("level"), Some("WARN"));
//! assert_eq!(event.get("code").map(|v| v.to_string()), Some("42".to_string()));
//! ```
//!
//! Hosts with their own record type implement [`Record`]; [`Event`] is the bundled flat record used
//! by the CLI and the tests.

#[macro_use]
mod macros;
mod api;
mod config;
mod engine;
mod error;
mod record;

pub use api::{DissectReport, DissectSummary, Dissector, EntryReport, MappingEntry};
pub use config::{DEFAULT_FAILURE_TAG, DissectConfig};
pub use engine::{
    CompileOptions, Conversion, ConversionIssue, ConversionSpec, Counter, Datatype, Delimiter, DissectMetrics,
    Dissection, EntryMetrics, FieldKind, FieldSpec, MetricsSink, NoopMetrics, Pattern, RepeatedDelimiters,
    RunMetrics, Segment,
};
pub use error::{ConfigError, DissectFailure, FieldFormatError, Result};
pub use record::{Event, Record, Value};

#[doc(hidden)]
pub mod __private {
    pub use once_cell;
    pub use regex;
}
