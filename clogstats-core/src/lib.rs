//! # clogstats-core
//!
//! Core library for clogstats - activity statistics for WeeChat IRC logs.
//!
//! This library provides:
//! - Domain types for log records, time windows and activity records
//! - Log discovery and parsing
//! - Per-channel and fleet-wide activity analysis
//! - Interval tables for time-series forecasting
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Architecture
//!
//! Data flows through three stages:
//! - **Raw:** `irc.<network>.<#channel>.weechatlog` files on disk (never modified)
//! - **Parsed:** [`LogRecord`]s with a message type and resolved participant
//! - **Derived:** one [`ActivityRecord`] per source and window, ranked
//!
//! ## Example
//!
//! ```rust,no_run
//! use clogstats_core::analytics::{FleetAggregator, FleetOptions};
//! use clogstats_core::{Config, TimeWindow};
//!
//! let config = Config::load().expect("failed to load config");
//! let fleet = FleetAggregator::new(config.log_dir(None));
//!
//! let report = fleet
//!     .analyze_all(&TimeWindow::unbounded(), &FleetOptions::default())
//!     .expect("failed to analyze logs");
//! for record in &report.records {
//!     println!("{}: {}", record.name, record.message_count());
//! }
//! ```

// Re-export commonly used items at the crate root
pub use analytics::{FleetAggregator, FleetOptions, FleetReport, NoiseFilters};
pub use config::Config;
pub use error::{Error, Result};
pub use ingest::{ChannelSelection, LogReader, ParseMode};
pub use types::*;

// Public modules
pub mod analytics;
pub mod config;
pub mod error;
pub mod format;
pub mod ingest;
pub mod logging;
pub mod types;
