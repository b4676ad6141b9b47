//! WeeChat log reader
//!
//! Parses `irc.<network>.<#channel>.weechatlog` files. Each line holds three
//! TAB-separated fields:
//!
//! ```text
//! 2020-06-19 12:47:03<TAB>@alice<TAB>hello	world
//! ```
//!
//! Only the first two TABs split; the body keeps any further TABs.
//!
//! # Error Handling
//!
//! - **Malformed lines** (missing fields, bad timestamp): in [`ParseMode::Lenient`]
//!   the line is skipped, logged as a warning and recorded in
//!   [`ReadResult::warnings`]. In [`ParseMode::Strict`] the whole source fails
//!   with [`Error::MalformedLine`].
//! - **Invalid UTF-8**: replaced lossily, never fatal.
//! - **Blank lines**: ignored.

use crate::error::{Error, Result};
use crate::ingest::classify::{classify, resolve_participant, strip_ansi};
use crate::types::{LogRecord, TimeWindow};
use chrono::NaiveDateTime;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Timestamp format of the first column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const DELIMITER: char = '\t';

/// What to do with a line that cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParseMode {
    /// Skip the line with a warning
    #[default]
    Lenient,
    /// Fail the whole source
    Strict,
}

/// Why a single line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LineError {
    #[error("expected timestamp, prefix and body separated by tabs")]
    MissingFields,
    #[error("unparseable timestamp {0:?}")]
    BadTimestamp(String),
}

/// Records read from one source.
#[derive(Debug, Default)]
pub struct ReadResult {
    /// Records inside the requested window, in file order
    pub records: Vec<LogRecord>,
    /// Number of non-blank lines seen
    pub lines_read: usize,
    /// Number of lines skipped as malformed
    pub malformed_lines: usize,
    /// Warnings encountered during parsing (non-fatal)
    pub warnings: Vec<String>,
}

/// Reads log sources into [`LogRecord`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReader {
    mode: ParseMode,
}

impl LogReader {
    /// Create a lenient reader.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: ParseMode) -> Self {
        Self { mode }
    }

    /// Read the file at `path`, keeping records inside `window`.
    ///
    /// The file is closed before this returns, on success or error.
    pub fn read(&self, path: &Path, window: &TimeWindow) -> Result<ReadResult> {
        let file = File::open(path).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to open {}: {}", path.display(), e),
            ))
        })?;
        self.read_from(BufReader::new(file), path, window)
    }

    /// Read records from any buffered reader. `path` is only used in messages.
    pub fn read_from<R: BufRead>(
        &self,
        mut reader: R,
        path: &Path,
        window: &TimeWindow,
    ) -> Result<ReadResult> {
        let mut result = ReadResult::default();
        let mut buf = Vec::new();
        let mut line_no = 0usize;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            line_no += 1;

            let raw = String::from_utf8_lossy(&buf);
            let line = raw.trim_end_matches(|c| c == '\n' || c == '\r');
            if line.is_empty() {
                continue;
            }
            result.lines_read += 1;

            match parse_line(line) {
                Ok(record) => {
                    if window.contains(record.timestamp) {
                        result.records.push(record);
                    }
                }
                Err(e) => match self.mode {
                    ParseMode::Strict => {
                        return Err(Error::MalformedLine {
                            path: path.to_path_buf(),
                            line: line_no,
                            reason: e.to_string(),
                        });
                    }
                    ParseMode::Lenient => {
                        tracing::warn!(
                            path = %path.display(),
                            line = line_no,
                            error = %e,
                            "Skipping malformed line"
                        );
                        result.malformed_lines += 1;
                        result
                            .warnings
                            .push(format!("{}:{}: {}", path.display(), line_no, e));
                    }
                },
            }
        }

        tracing::debug!(
            path = %path.display(),
            lines = result.lines_read,
            records = result.records.len(),
            malformed = result.malformed_lines,
            "Read log source"
        );

        Ok(result)
    }
}

/// Parse one line (without its newline) into a record.
pub fn parse_line(line: &str) -> std::result::Result<LogRecord, LineError> {
    let mut fields = line.splitn(3, DELIMITER);
    let (Some(timestr), Some(prefix), Some(body)) = (fields.next(), fields.next(), fields.next())
    else {
        return Err(LineError::MissingFields);
    };

    let timestr = strip_ansi(timestr);
    let timestamp = NaiveDateTime::parse_from_str(&timestr, TIMESTAMP_FORMAT)
        .map_err(|_| LineError::BadTimestamp(timestr.to_string()))?;

    let prefix = strip_ansi(prefix);
    let msg_type = classify(&prefix);
    let participant = resolve_participant(msg_type, &prefix, body);

    Ok(LogRecord {
        timestamp,
        msg_type,
        participant,
        body: body.to_string(),
    })
}
