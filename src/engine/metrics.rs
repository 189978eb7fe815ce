//! Dissection metrics.
//!
//! Two kinds of observation live here:
//!
//! - **Counters** (`matches`, `failures`) reported through a [`MetricsSink`] supplied by the host. The
//!   engine only ever increments them; aggregation and export are the host's business.
//! - **Run timings** ([`RunMetrics`]) collected by `Dissector::dissect_verbose` for profiling and the
//!   CLI report. The plain `dissect` path does not collect them.
//!
//! ## Design notes
//!
//! - [`DissectMetrics`] uses relaxed atomics so one instance can be shared by workers dissecting on
//!   different threads.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

// --- Counters ----------------------------------------------------------------

/// Counters the engine reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    /// A mapping entry matched and its fields were committed.
    Matches,
    /// A mapping entry failed for a record.
    Failures,
}

impl Counter {
    pub fn name(self) -> &'static str {
        match self {
            Counter::Matches => "matches",
            Counter::Failures => "failures",
        }
    }
}

/// Where counter increments go.
pub trait MetricsSink: Sync {
    fn increment(&self, counter: Counter);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn increment(&self, _counter: Counter) {}
}

/// In-process counters, safe to share across threads.
#[derive(Debug, Default)]
pub struct DissectMetrics {
    matches: AtomicU64,
    failures: AtomicU64,
}

impl DissectMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn matches(&self) -> u64 {
        self.matches.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

impl MetricsSink for DissectMetrics {
    fn increment(&self, counter: Counter) {
        let slot = match counter {
            Counter::Matches => &self.matches,
            Counter::Failures => &self.failures,
        };
        slot.fetch_add(1, Ordering::Relaxed);
    }
}

// --- Timings -----------------------------------------------------------------

/// Timings for one record.
#[derive(Debug, Default, Clone)]
pub struct RunMetrics {
    /// Total elapsed time, mapping entries plus conversion.
    pub total: Duration,
    /// One entry per mapping entry, in configuration order.
    pub entries: Vec<EntryMetrics>,
    /// Time spent in datatype conversion.
    pub convert: Duration,
}

/// Timing for a single mapping entry.
#[derive(Debug, Default, Clone)]
pub struct EntryMetrics {
    /// Source field the entry reads.
    pub source: String,
    /// Elapsed time for reading, matching and committing.
    pub duration: Duration,
    /// Number of fields committed (0 on failure).
    pub committed: usize,
}
