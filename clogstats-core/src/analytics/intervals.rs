//! Activity across evenly spaced intervals
//!
//! Splits a bounded window into `n` contiguous half-open sub-windows and runs
//! the fleet analysis on each, producing an [`ActivityTable`] with one row per
//! (source, sub-window). Forecasting consumes this table one source at a time
//! through [`ActivityTable::series`].
//!
//! Sources are parsed once over the whole window; each sub-window then only
//! re-runs the (cheap) analysis step.

use crate::analytics::fleet::{analyze_parsed, FleetAggregator, FleetOptions};
use crate::error::{Error, Result};
use crate::types::{ActivityRecord, TimeWindow};
use chrono::{Duration, NaiveDateTime};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Split `window` into `intervals` contiguous sub-windows of equal length.
///
/// Boundaries are computed to the millisecond; the last sub-window ends
/// exactly where `window` ends. An inverted window yields inverted (empty)
/// sub-windows.
pub fn split_window(window: &TimeWindow, intervals: usize) -> Result<Vec<TimeWindow>> {
    if intervals == 0 {
        return Err(Error::InvalidInterval(
            "interval count must be at least 1".to_string(),
        ));
    }
    let (start, end) = window.bounds().ok_or_else(|| {
        Error::InvalidInterval("window must be bounded on both sides".to_string())
    })?;

    let total_ms = i128::from((end - start).num_milliseconds());
    let n = intervals as i128;

    let mut boundaries: Vec<NaiveDateTime> = (0..intervals)
        .map(|i| {
            let offset = total_ms * i as i128 / n;
            start + Duration::milliseconds(offset as i64)
        })
        .collect();
    boundaries.push(end);

    Ok(boundaries
        .windows(2)
        .map(|pair| TimeWindow::between(pair[0], pair[1]))
        .collect())
}

/// One source's activity in one sub-window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityRow {
    /// Position of the sub-window in the split, from 0
    pub window_index: usize,
    pub window_start: NaiveDateTime,
    pub window_end: NaiveDateTime,
    pub record: ActivityRecord,
}

impl Serialize for ActivityRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut row = serializer.serialize_struct("ActivityRow", 7)?;
        row.serialize_field("window_index", &self.window_index)?;
        row.serialize_field("window_start", &self.window_start)?;
        row.serialize_field("window_end", &self.window_end)?;
        row.serialize_field("name", &self.record.name)?;
        row.serialize_field("participant_count", &self.record.participant_count())?;
        row.serialize_field("message_count", &self.record.message_count())?;
        row.serialize_field("participants", &self.record.participants)?;
        row.end()
    }
}

/// A point of a per-source activity series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct SeriesPoint {
    /// End of the sub-window this point summarizes
    pub time: NaiveDateTime,
    pub participant_count: usize,
    pub message_count: u64,
}

/// Activity rows, ordered by sub-window and then by rank within it.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct ActivityTable {
    rows: Vec<ActivityRow>,
}

impl ActivityTable {
    /// Append the ranked records of sub-window number `index`.
    pub fn push_window(
        &mut self,
        index: usize,
        window: &TimeWindow,
        records: Vec<ActivityRecord>,
    ) {
        let Some((start, end)) = window.bounds() else {
            return;
        };
        self.rows.extend(records.into_iter().map(|record| ActivityRow {
            window_index: index,
            window_start: start,
            window_end: end,
            record,
        }));
    }

    pub fn rows(&self) -> &[ActivityRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows of sub-window number `index`, in rank order.
    ///
    /// Sub-windows of a very short range can share bounds, so rows are
    /// matched by index rather than by start time.
    pub fn window_rows(&self, index: usize) -> impl Iterator<Item = &ActivityRow> + '_ {
        self.rows.iter().filter(move |row| row.window_index == index)
    }

    /// Distinct source names in the table.
    pub fn names(&self) -> BTreeSet<&str> {
        self.rows.iter().map(|row| row.record.name.as_str()).collect()
    }

    /// The evenly spaced series for one source, oldest first.
    pub fn series(&self, name: &str) -> Vec<SeriesPoint> {
        self.rows
            .iter()
            .filter(|row| row.record.name.as_str() == name)
            .map(|row| SeriesPoint {
                time: row.window_end,
                participant_count: row.record.participant_count(),
                message_count: row.record.message_count(),
            })
            .collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Result of an interval run.
#[derive(Debug, Default)]
pub struct IntervalReport {
    pub windows: Vec<TimeWindow>,
    pub table: ActivityTable,
    /// Sources that were skipped (path → error message)
    pub errors: Vec<(PathBuf, String)>,
    /// Warnings from parsing
    pub warnings: Vec<String>,
}

/// Run the fleet analysis over `intervals` sub-windows of `window`.
pub fn aggregate_over_intervals(
    fleet: &FleetAggregator,
    window: &TimeWindow,
    intervals: usize,
    options: &FleetOptions,
) -> Result<IntervalReport> {
    let windows = split_window(window, intervals)?;
    let parsed = fleet.load(window, &options.selection)?;

    let mut table = ActivityTable::default();
    for (index, sub_window) in windows.iter().enumerate() {
        let records = analyze_parsed(
            &parsed,
            sub_window,
            &options.noise_filters,
            options.sort_key,
        );
        table.push_window(index, sub_window, records);
    }

    tracing::info!(
        intervals = windows.len(),
        sources = parsed.sources.len(),
        rows = table.len(),
        "Aggregated activity over intervals"
    );

    Ok(IntervalReport {
        windows,
        table,
        errors: parsed.errors,
        warnings: parsed.warnings,
    })
}
