//! Analytics module for clogstats
//!
//! Turns parsed log records into activity statistics:
//! - [`channel`]: one source over one window → [`ActivityRecord`](crate::types::ActivityRecord)
//! - [`fleet`]: every discovered source, in parallel, ranked
//! - [`intervals`]: the fleet analysis repeated over evenly spaced sub-windows
//! - [`noise`]: per-network bot filters

pub mod channel;
pub mod fleet;
pub mod intervals;
pub mod noise;

pub use channel::analyze_channel;
pub use fleet::{
    analyze_parsed, rank, FleetAggregator, FleetOptions, FleetReport, ParsedLogs, ParsedSource,
};
pub use intervals::{
    aggregate_over_intervals, split_window, ActivityRow, ActivityTable, IntervalReport,
    SeriesPoint,
};
pub use noise::{NoiseFilters, NoiseSet};
