//! Fleet-wide analysis across every discovered channel log
//!
//! ```text
//!   discover ──► load (par: read each source) ──► analyze (par: one record
//!                                                  per source) ──► rank
//! ```
//!
//! Each source is read and analyzed independently, so both stages are plain
//! parallel maps over rayon's pool. The only join point is the final sort.
//!
//! A source that cannot be read (or fails in strict mode) is skipped and
//! listed in the report's `errors`; it never aborts its siblings. A missing
//! log directory fails the whole run.

use crate::analytics::channel::analyze_channel;
use crate::analytics::noise::NoiseFilters;
use crate::error::Result;
use crate::ingest::{discover_sources, ChannelSelection, LogReader, LogSource};
use crate::types::{ActivityRecord, LogRecord, SortKey, TimeWindow};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// One source's records, kept in memory for repeated analysis.
#[derive(Debug, Clone)]
pub struct ParsedSource {
    pub source: LogSource,
    /// Records in file order
    pub records: Vec<LogRecord>,
}

impl ParsedSource {
    /// Records inside `window`, in file order.
    pub fn records_in<'a>(&'a self, window: &'a TimeWindow) -> impl Iterator<Item = &'a LogRecord> {
        self.records
            .iter()
            .filter(move |record| window.contains(record.timestamp))
    }
}

/// Every selected source, parsed.
#[derive(Debug, Default)]
pub struct ParsedLogs {
    /// Parsed sources in discovery order
    pub sources: Vec<ParsedSource>,
    /// Sources that could not be parsed (path → error message)
    pub errors: Vec<(PathBuf, String)>,
    /// Warnings from parsing (malformed lines)
    pub warnings: Vec<String>,
}

/// What to analyze and how to rank it.
#[derive(Debug, Clone, Default)]
pub struct FleetOptions {
    pub selection: ChannelSelection,
    /// Defaults to the built-in bot table; use [`NoiseFilters::disabled`] to count everyone
    pub noise_filters: NoiseFilters,
    pub sort_key: SortKey,
}

/// Result of a fleet-wide analysis.
#[derive(Debug, Default)]
pub struct FleetReport {
    /// One record per analyzed source, ranked descending by the sort key
    pub records: Vec<ActivityRecord>,
    /// Sources that were skipped (path → error message)
    pub errors: Vec<(PathBuf, String)>,
    /// Warnings from parsing
    pub warnings: Vec<String>,
}

impl FleetReport {
    /// Counted messages across all channels.
    pub fn total_messages(&self) -> u64 {
        self.records.iter().map(ActivityRecord::message_count).sum()
    }
}

/// Runs channel analysis over every log in a directory.
#[derive(Debug, Clone)]
pub struct FleetAggregator {
    log_dir: PathBuf,
    reader: LogReader,
}

impl FleetAggregator {
    /// Create an aggregator over `log_dir` with a lenient reader.
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
            reader: LogReader::new(),
        }
    }

    /// Use a custom reader (e.g. strict parsing).
    pub fn with_reader(mut self, reader: LogReader) -> Self {
        self.reader = reader;
        self
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Discover the sources `selection` wants.
    pub fn discover(&self, selection: &ChannelSelection) -> Result<Vec<LogSource>> {
        discover_sources(&self.log_dir, selection)
    }

    /// Parse every selected source, keeping records inside `window`.
    pub fn load(&self, window: &TimeWindow, selection: &ChannelSelection) -> Result<ParsedLogs> {
        let sources = self.discover(selection)?;
        let reader = self.reader;

        let results: Vec<_> = sources
            .into_par_iter()
            .map(|source| {
                let result = reader.read(&source.path, window);
                (source, result)
            })
            .collect();

        let mut parsed = ParsedLogs::default();
        for (source, result) in results {
            match result {
                Ok(read) => {
                    parsed.warnings.extend(read.warnings);
                    parsed.sources.push(ParsedSource {
                        source,
                        records: read.records,
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        source = %source.identity,
                        path = %source.path.display(),
                        error = %e,
                        "Skipping unreadable source"
                    );
                    parsed.errors.push((source.path, e.to_string()));
                }
            }
        }

        tracing::info!(
            parsed = parsed.sources.len(),
            failed = parsed.errors.len(),
            warnings = parsed.warnings.len(),
            "Loaded log sources"
        );

        Ok(parsed)
    }

    /// Discover, parse, analyze and rank every selected source.
    pub fn analyze_all(&self, window: &TimeWindow, options: &FleetOptions) -> Result<FleetReport> {
        let parsed = self.load(window, &options.selection)?;
        let records = analyze_parsed(&parsed, window, &options.noise_filters, options.sort_key);
        Ok(FleetReport {
            records,
            errors: parsed.errors,
            warnings: parsed.warnings,
        })
    }
}

/// Analyze already-parsed sources over `window` and rank the results.
pub fn analyze_parsed(
    parsed: &ParsedLogs,
    window: &TimeWindow,
    noise_filters: &NoiseFilters,
    sort_key: SortKey,
) -> Vec<ActivityRecord> {
    let mut records: Vec<ActivityRecord> = parsed
        .sources
        .par_iter()
        .map(|parsed_source| {
            let identity = &parsed_source.source.identity;
            analyze_channel(
                identity.clone(),
                parsed_source.records_in(window),
                noise_filters.for_network(identity.network()),
            )
        })
        .collect();
    rank(&mut records, sort_key);
    records
}

/// Sort descending by `key`. Ties keep their current order.
pub fn rank(records: &mut [ActivityRecord], key: SortKey) {
    records.sort_by(|a, b| key.value(b).cmp(&key.value(a)));
}
