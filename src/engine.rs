//! Pattern compilation and dissection engine.
//!
//! This module is the core of the crate. It is split into focused submodules under `src/engine/`
//! while keeping public paths flat (for example `crate::engine::Pattern`).
//!
//! ## How the parts work together
//!
//! ```text
//! pattern string ──┐
//!                  │  FieldSpec::parse          (field.rs)
//!                  │  Pattern::compile          (compiler.rs)
//!                  └───────────────┬───────────
//!                                  │  Vec<Segment>, immutable, shareable
//!                                  v
//! input ────────────────── scan (matcher.rs)
//!                            - one cursor, left to right
//!                            - Delimiter::find / skip_repeats (search.rs)
//!                                  │  Vec<Capture>
//!                                  v
//!                          resolve (resolve.rs)
//!                            - normal / skip / append / indirect
//!                                  │  Dissection
//!                                  v
//!                          commit into the record (api.rs)
//!                                  │
//!                                  v
//!                          ConversionSpec::apply (convert.rs)
//! ```
//!
//! A `Pattern` and a `ConversionSpec` are built once and only read afterwards. Everything created
//! while dissecting (captures, append buffers, the `Dissection`) belongs to a single call.
//!
//! ## Responsibilities by module
//!
//! - `field.rs`: placeholder syntax and modifier validation.
//! - `compiler.rs`: pattern string to `Segment`s; delimiter repeat policy.
//! - `search.rs`: delimiter search strategies.
//! - `matcher.rs`: the single-pass scan.
//! - `resolve.rs`: append joining and indirect key resolution.
//! - `convert.rs`: `int` / `float` conversion.
//! - `metrics.rs`: counters and run timings.
//!
//! ## Debugging
//!
//! Every step logs through `tracing`. `RUST_LOG=dissector=trace` shows each capture.

#[path = "engine/compiler.rs"]
mod compiler;
#[path = "engine/convert.rs"]
mod convert;
#[path = "engine/field.rs"]
mod field;
#[path = "engine/matcher.rs"]
mod matcher;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/resolve.rs"]
mod resolve;
#[path = "engine/search.rs"]
mod search;

#[cfg(test)]
#[path = "engine/tests.rs"]
mod tests;

pub use compiler::{CompileOptions, Pattern, RepeatedDelimiters, Segment};
pub use convert::{Conversion, ConversionIssue, ConversionSpec, Datatype};
pub use field::{FieldKind, FieldSpec};
pub use metrics::{Counter, DissectMetrics, EntryMetrics, MetricsSink, NoopMetrics, RunMetrics};
pub use resolve::Dissection;
pub use search::Delimiter;
