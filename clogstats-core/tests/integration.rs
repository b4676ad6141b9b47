//! Integration tests for the clogstats analysis pipeline
//!
//! These tests use the channel logs in `tests/fixtures/logs/` to verify
//! discovery, parsing and ranking end to end.

use chrono::{NaiveDate, NaiveDateTime};
use clogstats_core::analytics::intervals::aggregate_over_intervals;
use clogstats_core::{
    ActivityRecord, ChannelSelection, Error, FleetAggregator, FleetOptions, LogReader,
    NoiseFilters, ParseMode, SortKey, TimeWindow,
};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Get the path to the fixture log directory
fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/logs")
}

/// Copy the fixture logs into a scratch directory that tests may modify
fn scratch_copy() -> TempDir {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    for entry in fs::read_dir(fixture_dir()).expect("failed to list fixtures") {
        let path = entry.expect("failed to read fixture entry").path();
        let target = temp_dir.path().join(path.file_name().unwrap());
        fs::copy(&path, target).expect("failed to copy fixture");
    }
    temp_dir
}

fn ts(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2020, 6, 19)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

/// The window used by the fixtures' scenario: 12:46 up to (not including) 13:43
fn scenario_window() -> TimeWindow {
    TimeWindow::between(ts(12, 46), ts(13, 43))
}

fn find<'a>(records: &'a [ActivityRecord], name: &str) -> &'a ActivityRecord {
    records
        .iter()
        .find(|r| r.name.as_str() == name)
        .unwrap_or_else(|| panic!("no record for {name}"))
}

fn names(records: &[ActivityRecord]) -> Vec<&str> {
    records.iter().map(|r| r.name.as_str()).collect()
}

fn counts(pairs: &[(&str, u64)]) -> BTreeMap<String, u64> {
    pairs.iter().map(|(n, c)| (n.to_string(), *c)).collect()
}

// ============================================
// Fleet analysis
// ============================================

#[test]
fn test_fleet_scenario_counts() {
    clogstats_core::logging::init_test();
    let fleet = FleetAggregator::new(fixture_dir());
    let report = fleet
        .analyze_all(&scenario_window(), &FleetOptions::default())
        .unwrap();

    assert!(report.errors.is_empty(), "errors: {:?}", report.errors);

    // Non-channel buffers (irc.server.*) are not discovered
    assert_eq!(report.records.len(), 4);

    // Burst collapsed, bot filtered, window ends excluded
    let firefox = find(&report.records, "freenode.#firefox");
    assert_eq!(firefox.participants, counts(&[("alice", 2), ("bob", 1)]));
    assert_eq!(firefox.message_count(), 3);
    assert_eq!(firefox.participant_count(), 2);
    assert!(!firefox.participants.contains_key("carol"));
    assert!(!firefox.participants.contains_key("dave"));

    // Mode prefixes stripped; bots matched case-insensitively
    let anime = find(&report.records, "rizon.#anime");
    assert_eq!(
        anime.participants,
        counts(&[("gina", 2), ("hank", 1), ("ivan", 1)])
    );

    // Join/leave only
    let go = find(&report.records, "freenode.#go-nuts");
    assert!(go.is_empty());

    assert_eq!(report.total_messages(), 4 + 3 + 2);
}

#[test]
fn test_fleet_ranking() {
    let fleet = FleetAggregator::new(fixture_dir());

    let by_messages = fleet
        .analyze_all(&scenario_window(), &FleetOptions::default())
        .unwrap();
    assert_eq!(
        names(&by_messages.records),
        vec![
            "rizon.#anime",
            "freenode.#firefox",
            "freenode.#broken",
            "freenode.#go-nuts"
        ]
    );

    let options = FleetOptions {
        sort_key: SortKey::Participants,
        ..Default::default()
    };
    let by_participants = fleet.analyze_all(&scenario_window(), &options).unwrap();
    // #broken and #firefox tie at two; discovery order breaks the tie
    assert_eq!(
        names(&by_participants.records),
        vec![
            "rizon.#anime",
            "freenode.#broken",
            "freenode.#firefox",
            "freenode.#go-nuts"
        ]
    );
}

#[test]
fn test_disabled_noise_filters_count_bots() {
    let fleet = FleetAggregator::new(fixture_dir());
    let options = FleetOptions {
        noise_filters: NoiseFilters::disabled(),
        ..Default::default()
    };
    let report = fleet.analyze_all(&scenario_window(), &options).unwrap();

    let firefox = find(&report.records, "freenode.#firefox");
    assert_eq!(firefox.participants.get("jellobot"), Some(&1));
    let anime = find(&report.records, "rizon.#anime");
    assert_eq!(anime.participants.get("Internets"), Some(&1));
}

#[test]
fn test_custom_noise_filters() {
    let fleet = FleetAggregator::new(fixture_dir());
    let options = FleetOptions {
        noise_filters: NoiseFilters::from_map([("rizon", ["GINA"])]),
        ..Default::default()
    };
    let report = fleet.analyze_all(&scenario_window(), &options).unwrap();

    let anime = find(&report.records, "rizon.#anime");
    assert_eq!(
        anime.participants,
        counts(&[("Internets", 1), ("hank", 1), ("ivan", 1)])
    );
    // The override replaces the built-in table entirely
    let firefox = find(&report.records, "freenode.#firefox");
    assert_eq!(firefox.participants.get("jellobot"), Some(&1));
}

#[test]
fn test_channel_selection() {
    let fleet = FleetAggregator::new(fixture_dir());

    let options = FleetOptions {
        selection: ChannelSelection::including(["freenode.#firefox", "rizon.#anime"]),
        ..Default::default()
    };
    let report = fleet.analyze_all(&scenario_window(), &options).unwrap();
    assert_eq!(
        names(&report.records),
        vec!["rizon.#anime", "freenode.#firefox"]
    );

    let options = FleetOptions {
        selection: ChannelSelection::excluding(["rizon.#anime"]),
        ..Default::default()
    };
    let report = fleet.analyze_all(&scenario_window(), &options).unwrap();
    assert_eq!(report.records.len(), 3);
    assert!(!names(&report.records).contains(&"rizon.#anime"));

    // Exclusion wins over inclusion
    let mut selection = ChannelSelection::including(["rizon.#anime"]);
    selection.exclude.insert("rizon.#anime".to_string());
    let options = FleetOptions {
        selection,
        ..Default::default()
    };
    let report = fleet.analyze_all(&scenario_window(), &options).unwrap();
    assert!(report.records.is_empty());
}

#[test]
fn test_inverted_window_yields_empty_records() {
    let fleet = FleetAggregator::new(fixture_dir());
    let window = TimeWindow::between(ts(13, 43), ts(12, 46));
    let report = fleet.analyze_all(&window, &FleetOptions::default()).unwrap();

    assert_eq!(report.records.len(), 4);
    assert!(report.records.iter().all(ActivityRecord::is_empty));
    assert_eq!(report.total_messages(), 0);
}

// ============================================
// Failure handling
// ============================================

#[test]
fn test_malformed_line_skipped_when_lenient() {
    let fleet = FleetAggregator::new(fixture_dir());
    let report = fleet
        .analyze_all(&scenario_window(), &FleetOptions::default())
        .unwrap();

    let broken = find(&report.records, "freenode.#broken");
    assert_eq!(broken.participants, counts(&[("erin", 1), ("frank", 1)]));
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("irc.freenode.#broken.weechatlog:2"));
}

#[test]
fn test_malformed_line_fails_source_when_strict() {
    let fleet =
        FleetAggregator::new(fixture_dir()).with_reader(LogReader::with_mode(ParseMode::Strict));
    let report = fleet
        .analyze_all(&scenario_window(), &FleetOptions::default())
        .unwrap();

    // Only the broken source is dropped
    assert_eq!(report.records.len(), 3);
    assert!(!names(&report.records).contains(&"freenode.#broken"));
    assert_eq!(report.errors.len(), 1);
    let (path, message) = &report.errors[0];
    assert!(path.ends_with("irc.freenode.#broken.weechatlog"));
    assert!(message.contains("line 2"), "message: {message}");
}

#[test]
fn test_unreadable_source_is_isolated() {
    let temp_dir = scratch_copy();
    // A directory matching the log pattern opens but cannot be read
    fs::create_dir(temp_dir.path().join("irc.freenode.#unreadable.weechatlog")).unwrap();

    let fleet = FleetAggregator::new(temp_dir.path());
    let report = fleet
        .analyze_all(&scenario_window(), &FleetOptions::default())
        .unwrap();

    assert_eq!(report.records.len(), 4);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0]
        .0
        .ends_with("irc.freenode.#unreadable.weechatlog"));
    assert_eq!(
        find(&report.records, "freenode.#firefox").message_count(),
        3
    );
}

#[test]
fn test_missing_log_dir_fails() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("does-not-exist");
    let fleet = FleetAggregator::new(&missing);

    let err = fleet
        .analyze_all(&scenario_window(), &FleetOptions::default())
        .unwrap_err();
    match err {
        Error::LogDirNotFound(path) => assert_eq!(path, missing),
        other => panic!("expected LogDirNotFound, got {other:?}"),
    }
}

#[test]
fn test_empty_log_dir() {
    let temp_dir = TempDir::new().unwrap();
    let report = FleetAggregator::new(temp_dir.path())
        .analyze_all(&TimeWindow::unbounded(), &FleetOptions::default())
        .unwrap();
    assert!(report.records.is_empty());
    assert!(report.errors.is_empty());
}

// ============================================
// Intervals
// ============================================

#[test]
fn test_single_interval_matches_fleet() {
    let fleet = FleetAggregator::new(fixture_dir());
    let options = FleetOptions::default();

    let fleet_report = fleet.analyze_all(&scenario_window(), &options).unwrap();
    let interval_report = aggregate_over_intervals(&fleet, &scenario_window(), 1, &options).unwrap();

    assert_eq!(interval_report.windows, vec![scenario_window()]);
    let records: Vec<ActivityRecord> = interval_report
        .table
        .rows()
        .iter()
        .map(|row| row.record.clone())
        .collect();
    assert_eq!(records, fleet_report.records);
    assert_eq!(interval_report.warnings, fleet_report.warnings);
}

#[test]
fn test_interval_totals_sum_to_whole_window() {
    let fleet = FleetAggregator::new(fixture_dir());
    let options = FleetOptions::default();
    let window = TimeWindow::between(ts(12, 0), ts(14, 0));

    let whole = fleet.analyze_all(&window, &options).unwrap();
    let split = aggregate_over_intervals(&fleet, &window, 2, &options).unwrap();

    assert_eq!(split.windows.len(), 2);
    assert_eq!(split.windows[0].end, Some(ts(13, 0)));
    assert_eq!(split.table.len(), 2 * whole.records.len());

    let mut summed: HashMap<&str, u64> = HashMap::new();
    for row in split.table.rows() {
        *summed.entry(row.record.name.as_str()).or_default() += row.record.message_count();
    }
    for record in &whole.records {
        assert_eq!(
            summed.get(record.name.as_str()),
            Some(&record.message_count()),
            "totals differ for {}",
            record.name
        );
    }

    // A line exactly on the boundary lands in the later interval only
    let broken = split.table.series("freenode.#broken");
    assert_eq!(broken[0].message_count, 0);
    assert_eq!(broken[1].message_count, 2);
}

#[test]
fn test_interval_table_json() {
    let fleet = FleetAggregator::new(fixture_dir());
    let report = aggregate_over_intervals(
        &fleet,
        &TimeWindow::between(ts(12, 0), ts(14, 0)),
        4,
        &FleetOptions::default(),
    )
    .unwrap();

    let value: serde_json::Value = serde_json::from_str(&report.table.to_json().unwrap()).unwrap();
    let rows = value.as_array().unwrap();
    assert_eq!(rows.len(), 4 * 4);
    assert_eq!(rows[0]["window_start"], "2020-06-19T12:00:00");
    assert_eq!(rows[0]["window_end"], "2020-06-19T12:30:00");

    let series = report.table.series("freenode.#firefox");
    let times: Vec<_> = series.iter().map(|p| p.time).collect();
    assert_eq!(times, vec![ts(12, 30), ts(13, 0), ts(13, 30), ts(14, 0)]);
}

#[test]
fn test_interval_rejects_unbounded_window() {
    let fleet = FleetAggregator::new(fixture_dir());
    let err = aggregate_over_intervals(
        &fleet,
        &TimeWindow::unbounded(),
        3,
        &FleetOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::InvalidInterval(_)));
}

#[test]
fn test_reader_reads_fixture_in_file_order() {
    let path: &Path = &fixture_dir().join("irc.freenode.#firefox.weechatlog");
    let result = LogReader::new()
        .read(path, &TimeWindow::unbounded())
        .unwrap();

    assert_eq!(result.lines_read, 13);
    assert_eq!(result.records.len(), 13);
    assert_eq!(result.malformed_lines, 0);
    assert!(result
        .records
        .windows(2)
        .all(|pair| pair[0].timestamp <= pair[1].timestamp));
}
