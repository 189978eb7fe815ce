use crate::config::DissectConfig;
use crate::engine::{
    CompileOptions, ConversionIssue, ConversionSpec, Counter, Dissection, EntryMetrics, MetricsSink, Pattern,
    RunMetrics,
};
use crate::error::{ConfigError, DissectFailure};
use crate::record::{Record, Value};
use std::time::Instant;

/// One `(source field, pattern)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    source: String,
    pattern: Pattern,
}

impl MappingEntry {
    pub fn new(source: impl Into<String>, pattern: Pattern) -> Self {
        MappingEntry { source: source.into(), pattern }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Dissect the current value of the source field of `record`.
    ///
    /// The record is only read; commit the returned [`Dissection`] to apply it.
    pub fn apply<R: Record + ?Sized>(&self, record: &R) -> Result<Dissection, DissectFailure> {
        let input = match record.get(&self.source) {
            None => return Err(DissectFailure::SourceFieldMissing { field: self.source.clone() }),
            Some(Value::Null) => return Err(DissectFailure::EmptyInput),
            Some(value) => match value.as_text() {
                Some(text) => text.into_owned(),
                None => return Err(DissectFailure::SourceNotText { field: self.source.clone() }),
            },
        };
        self.pattern.dissect_with(&input, &RecordView(record))
    }
}

/// Adapter so a generic (possibly unsized) record can be handed to the resolver as `&dyn Record`.
struct RecordView<'a, R: ?Sized>(&'a R);

impl<R: Record + ?Sized> std::fmt::Debug for RecordView<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self.0, f)
    }
}

impl<R: Record + ?Sized> Record for RecordView<'_, R> {
    fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    fn set(&mut self, _field: &str, _value: Value) {}

    fn tag(&mut self, _tag: &str) {}
}

/// Per-record tally returned by [`Dissector::dissect`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DissectSummary {
    /// Mapping entries that matched and committed.
    pub matches: usize,
    /// Mapping entries that failed.
    pub failures: usize,
}

/// What happened to one mapping entry, as reported by [`Dissector::dissect_verbose`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryReport {
    pub source: String,
    pub pattern: String,
    /// Committed `(key, value)` pairs, or the reason nothing was committed.
    pub outcome: Result<Vec<(String, String)>, DissectFailure>,
}

/// Detailed account of one record's dissection.
///
/// This is meant for debugging and the CLI; the plain [`Dissector::dissect`] path does not build it.
#[derive(Debug, Clone)]
pub struct DissectReport {
    pub entries: Vec<EntryReport>,
    pub conversion_issues: Vec<ConversionIssue>,
    pub metrics: RunMetrics,
}

impl DissectReport {
    pub fn summary(&self) -> DissectSummary {
        let matches = self.entries.iter().filter(|e| e.outcome.is_ok()).count();
        DissectSummary { matches, failures: self.entries.len() - matches }
    }
}

/// A configured dissect engine.
///
/// Built once from a [`DissectConfig`]; all compiled state is immutable afterwards, so one
/// `Dissector` can be shared by reference across threads.
///
/// # Example
/// ```
/// use dissector::{DissectConfig, Dissector, Event, NoopMetrics};
///
/// let config = DissectConfig::new().with_mapping("message", "%{?a}: %{&a}");
/// let dissector = Dissector::new(&config).unwrap();
///
/// let mut event = Event::with_fields([("message", "google: 77.98")]);
/// dissector.dissect(&mut event, &NoopMetrics);
/// assert_eq!(event.text("google"), Some("77.98"));
/// ```
#[derive(Debug, Clone)]
pub struct Dissector {
    entries: Vec<MappingEntry>,
    conversions: ConversionSpec,
    tag_on_failure: Vec<String>,
}

impl Dissector {
    /// Compile every pattern and validate every conversion in `config`.
    ///
    /// Entries with an empty pattern string are skipped.
    pub fn new(config: &DissectConfig) -> Result<Self, ConfigError> {
        let options = CompileOptions { repeated_delimiters: config.repeated_delimiters };

        let mut entries = Vec::with_capacity(config.mapping.len());
        for (source, text) in &config.mapping {
            if text.is_empty() {
                tracing::debug!(field = %source, "skipping mapping entry with an empty pattern");
                continue;
            }
            entries.push(MappingEntry::new(source.clone(), Pattern::compile_with(text, options)?));
        }

        let conversions = ConversionSpec::new(config.convert_datatype.iter().map(|(f, t)| (f.clone(), t)))?;

        Ok(Dissector { entries, conversions, tag_on_failure: config.tag_on_failure.clone() })
    }

    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    pub fn conversions(&self) -> &ConversionSpec {
        &self.conversions
    }

    pub fn tag_on_failure(&self) -> &[String] {
        &self.tag_on_failure
    }

    /// Run every mapping entry against `record` in order, then the conversions.
    ///
    /// Failures never escape: a failed entry commits nothing, tags the record with `tag_on_failure`
    /// and bumps the `failures` counter.
    pub fn dissect<R: Record + ?Sized>(&self, record: &mut R, metrics: &dyn MetricsSink) -> DissectSummary {
        tracing::debug!(record = ?record, "record before dissection");

        let mut summary = DissectSummary::default();
        for entry in &self.entries {
            match self.run_entry(entry, record, metrics) {
                Ok(_) => summary.matches += 1,
                Err(_) => summary.failures += 1,
            }
        }
        if !self.conversions.is_empty() {
            self.conversions.apply(record);
        }

        tracing::debug!(record = ?record, "record after dissection");
        summary
    }

    /// Dissect each record in order. A failure on one record has no effect on the others.
    pub fn dissect_batch<R: Record>(&self, records: &mut [R], metrics: &dyn MetricsSink) -> DissectSummary {
        records.iter_mut().fold(DissectSummary::default(), |acc, record| {
            let s = self.dissect(record, metrics);
            DissectSummary { matches: acc.matches + s.matches, failures: acc.failures + s.failures }
        })
    }

    /// Like [`dissect`](Self::dissect), but also return what each entry did and how long it took.
    pub fn dissect_verbose<R: Record + ?Sized>(&self, record: &mut R, metrics: &dyn MetricsSink) -> DissectReport {
        let started = Instant::now();
        let mut entries = Vec::with_capacity(self.entries.len());
        let mut run = RunMetrics::default();

        for entry in &self.entries {
            let entry_started = Instant::now();
            let outcome = self.run_entry(entry, record, metrics);
            run.entries.push(EntryMetrics {
                source: entry.source.clone(),
                duration: entry_started.elapsed(),
                committed: outcome.as_ref().map_or(0, Vec::len),
            });
            entries.push(EntryReport {
                source: entry.source.clone(),
                pattern: entry.pattern.source().to_string(),
                outcome,
            });
        }

        let convert_started = Instant::now();
        let conversion_issues =
            if self.conversions.is_empty() { Vec::new() } else { self.conversions.apply(record) };
        run.convert = convert_started.elapsed();
        run.total = started.elapsed();

        DissectReport { entries, conversion_issues, metrics: run }
    }

    fn run_entry<R: Record + ?Sized>(
        &self,
        entry: &MappingEntry,
        record: &mut R,
        metrics: &dyn MetricsSink,
    ) -> Result<Vec<(String, String)>, DissectFailure> {
        match entry.apply(record) {
            Ok(dissection) => {
                let committed: Vec<(String, String)> =
                    dissection.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
                dissection.commit(record);
                metrics.increment(Counter::Matches);
                Ok(committed)
            }
            Err(failure) => {
                match &failure {
                    DissectFailure::SourceFieldMissing { .. } => {
                        tracing::warn!(field = %entry.source, "dissector mapping, source field not found")
                    }
                    other => tracing::warn!(field = %entry.source, reason = %other, "dissector mapping failed"),
                }
                for tag in &self.tag_on_failure {
                    record.tag(tag);
                }
                metrics.increment(Counter::Failures);
                Err(failure)
            }
        }
    }
}
