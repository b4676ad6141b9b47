//! clogstats - activity statistics for WeeChat IRC logs
//!
//! Ranks channels by how active they were over the last few hours.

use anyhow::{Context, Result};
use chrono::{Duration, Local, NaiveDateTime};
use clap::Parser;
use clogstats_core::analytics::intervals::{
    aggregate_over_intervals, ActivityRow, IntervalReport,
};
use clogstats_core::format::{align_columns, format_top_participants};
use clogstats_core::{
    ActivityRecord, ChannelSelection, Config, FleetAggregator, FleetOptions, FleetReport,
    LogReader, NoiseFilters, ParseMode, SortKey, TimeWindow,
};
use std::path::PathBuf;

/// Printed timestamps drop sub-second precision.
const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Parser)]
#[command(name = "clogstats")]
#[command(about = "Gather statistics from WeeChat log files")]
#[command(version)]
struct Args {
    /// Start analyzing messages from DURATION hours ago
    #[arg(short, long, default_value_t = 24.0, allow_negative_numbers = true)]
    duration: f64,

    /// Limit output to the top NUM channels
    #[arg(short, long)]
    num: Option<usize>,

    /// Limit output to channels with at least MIN_ACTIVITY messages
    #[arg(long, default_value_t = 0)]
    min_activity: u64,

    /// Limit output to channels with at least MIN_NICKS nicks
    #[arg(long, default_value_t = 0)]
    min_nicks: usize,

    /// Show the MAX_TOPWORDS most active nicks with their message counts
    #[arg(long, default_value_t = 3)]
    max_topwords: usize,

    /// Key to sort channels by: messages (msgs) or participants (nicks)
    #[arg(short, long, default_value = "messages")]
    sort_by: SortKey,

    /// Only analyze these channels, as "network.#channel"
    #[arg(long, num_args = 0..)]
    include_channels: Vec<String>,

    /// Channels to exclude, as "network.#channel"
    #[arg(long, num_args = 0..)]
    exclude_channels: Vec<String>,

    /// Disable filtering of known bots
    #[arg(long)]
    disable_bot_filters: bool,

    /// Directory to read logs from (defaults to $WEECHAT_HOME/logs)
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Skip a whole channel on its first malformed line
    #[arg(long)]
    strict: bool,

    /// Split the range into N equal intervals and report each one
    #[arg(long)]
    intervals: Option<usize>,

    /// Output format: text (default) or json
    #[arg(short, long, default_value = "text")]
    format: String,
}

impl Args {
    fn selection(&self) -> ChannelSelection {
        ChannelSelection {
            include: self.include_channels.iter().cloned().collect(),
            exclude: self.exclude_channels.iter().cloned().collect(),
        }
    }

    /// Whether a record survives the `--min-*` filters.
    fn shows(&self, record: &ActivityRecord) -> bool {
        record.message_count() >= self.min_activity && record.participant_count() >= self.min_nicks
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.format != "text" && args.format != "json" {
        anyhow::bail!("unknown format '{}', expected text or json", args.format);
    }

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;

    // Initialize logging
    let _log_guard =
        clogstats_core::logging::init(&config.logging).context("failed to initialize logging")?;

    let window = window_from_now(args.duration)?;
    let log_dir = config.log_dir(args.log_dir.as_deref());

    let mode = if args.strict {
        ParseMode::Strict
    } else {
        config.parse_mode()
    };
    let noise_filters = if args.disable_bot_filters {
        NoiseFilters::disabled()
    } else {
        config.noise_filters()
    };

    tracing::info!(
        log_dir = %log_dir.display(),
        duration_hours = args.duration,
        sort_by = %args.sort_by,
        ?mode,
        "clogstats starting"
    );

    let fleet = FleetAggregator::new(&log_dir).with_reader(LogReader::with_mode(mode));
    let options = FleetOptions {
        selection: args.selection(),
        noise_filters,
        sort_key: args.sort_by,
    };

    match args.intervals {
        Some(intervals) => {
            let report = aggregate_over_intervals(&fleet, &window, intervals, &options)
                .with_context(|| analyze_failed(&fleet))?;
            print_source_errors(&report.errors);
            let rows = visible_rows(&args, &report);
            if args.format == "json" {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                print_interval_table(&args, &rows);
            }
        }
        None => {
            let report = fleet
                .analyze_all(&window, &options)
                .with_context(|| analyze_failed(&fleet))?;
            print_source_errors(&report.errors);
            if args.format == "json" {
                print_json_report(&args, &window, &report)?;
            } else {
                print_text_report(&args, &window, &report);
            }
        }
    }

    Ok(())
}

fn analyze_failed(fleet: &FleetAggregator) -> String {
    format!("failed to analyze logs in {}", fleet.log_dir().display())
}

/// The window ending now and starting `hours` ago.
fn window_from_now(hours: f64) -> Result<TimeWindow> {
    let millis = hours * 3_600_000.0;
    if millis.is_nan() || millis.abs() >= i64::MAX as f64 {
        anyhow::bail!("duration of {} hours is out of range", hours);
    }
    let span = Duration::try_milliseconds(millis as i64)
        .with_context(|| format!("duration of {} hours is out of range", hours))?;

    let end = Local::now().naive_local();
    let start = end
        .checked_sub_signed(span)
        .with_context(|| format!("duration of {} hours is out of range", hours))?;
    Ok(TimeWindow::between(start, end))
}

fn print_source_errors(errors: &[(PathBuf, String)]) {
    for (path, error) in errors {
        eprintln!("warning: skipped {}: {}", path.display(), error);
    }
}

fn display(ts: Option<NaiveDateTime>) -> String {
    ts.map(|ts| ts.format(DISPLAY_FORMAT).to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn print_text_report(args: &Args, window: &TimeWindow, report: &FleetReport) {
    println!(
        "Analyzing logs from {} till {}",
        display(window.start),
        display(window.end)
    );
    println!("total messages: {}", report.total_messages());

    let mut rows = vec![header(&["RANK", "CHANNEL", "MSGS", "NICKS", "TOPWORDS"])];
    rows.extend(
        report
            .records
            .iter()
            .filter(|record| args.shows(record))
            .take(args.num.unwrap_or(usize::MAX))
            .enumerate()
            .map(|(i, record)| {
                let mut row = vec![format!("{}.", i + 1)];
                row.extend(record_cells(args, record));
                row
            }),
    );
    print!("{}", align_columns(&rows));
}

/// Rows passing the `--min-*` filters, at most `--num` per sub-window.
fn visible_rows<'a>(args: &Args, report: &'a IntervalReport) -> Vec<&'a ActivityRow> {
    let mut rows = Vec::new();
    for index in 0..report.windows.len() {
        rows.extend(
            report
                .table
                .window_rows(index)
                .filter(|row| args.shows(&row.record))
                .take(args.num.unwrap_or(usize::MAX)),
        );
    }
    rows
}

fn print_interval_table(args: &Args, rows: &[&ActivityRow]) {
    let mut table = vec![header(&["START", "END", "CHANNEL", "MSGS", "NICKS", "TOPWORDS"])];
    table.extend(rows.iter().map(|row| {
        let mut cells = vec![
            display(Some(row.window_start)),
            display(Some(row.window_end)),
        ];
        cells.extend(record_cells(args, &row.record));
        cells
    }));
    print!("{}", align_columns(&table));
}

fn header(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

/// CHANNEL, MSGS, NICKS and TOPWORDS cells for one record.
fn record_cells(args: &Args, record: &ActivityRecord) -> [String; 4] {
    [
        record.name.to_string(),
        record.message_count().to_string(),
        record.participant_count().to_string(),
        format_top_participants(record, args.max_topwords),
    ]
}

fn print_json_report(args: &Args, window: &TimeWindow, report: &FleetReport) -> Result<()> {
    let channels: Vec<_> = report
        .records
        .iter()
        .filter(|record| args.shows(record))
        .take(args.num.unwrap_or(usize::MAX))
        .map(|record| {
            serde_json::json!({
                "name": record.name,
                "message_count": record.message_count(),
                "participant_count": record.participant_count(),
                "participants": record.participants,
            })
        })
        .collect();

    let output = serde_json::json!({
        "start": window.start,
        "end": window.end,
        "sort_by": args.sort_by,
        "total_messages": report.total_messages(),
        "channels": channels,
        "errors": report
            .errors
            .iter()
            .map(|(path, error)| serde_json::json!({
                "path": path.display().to_string(),
                "error": error,
            }))
            .collect::<Vec<_>>(),
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
