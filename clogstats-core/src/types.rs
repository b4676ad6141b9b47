//! Core domain types for clogstats
//!
//! These types carry a chat log from raw lines to ranked activity.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Source** | One log file holding one channel's history |
//! | **Network** | The IRC network a channel lives on; selects the noise filter |
//! | **Participant** | A nick that an activity record is attributed to |
//! | **Burst** | Consecutive activity from one participant, counted once |
//! | **Window** | A half-open `[start, end)` slice of time, either end optional |

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// ============================================
// Log records
// ============================================

/// Kind of line in a WeeChat log, determined by its prefix column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    /// Regular message; the prefix is the sender's nick
    Message,
    /// Someone joined the channel
    Join,
    /// Someone left or quit
    Quit,
    /// `/me` action
    Action,
    /// Network notice (topic change, mode change, ...)
    Network,
    /// Client error line
    Error,
    /// Line without a prefix
    Other,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Message => "message",
            MessageType::Join => "join",
            MessageType::Quit => "quit",
            MessageType::Action => "action",
            MessageType::Network => "network",
            MessageType::Error => "error",
            MessageType::Other => "other",
        }
    }

    /// Whether lines of this type count toward channel activity.
    pub fn counts_as_activity(&self) -> bool {
        matches!(self, MessageType::Message | MessageType::Action)
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single parsed log line.
///
/// The participant is resolved once at construction; see
/// [`crate::ingest::classify::resolve_participant`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub timestamp: NaiveDateTime,
    pub msg_type: MessageType,
    /// Nick of the actor, for types that carry one
    pub participant: Option<String>,
    pub body: String,
}

// ============================================
// Time windows
// ============================================

/// Half-open time range `[start, end)`. A missing end is unbounded.
///
/// A window whose end is at or before its start contains nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl TimeWindow {
    /// A window that excludes nothing.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// A window bounded on both sides.
    pub fn between(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        self.start.map_or(true, |start| ts >= start) && self.end.map_or(true, |end| ts < end)
    }

    /// Both ends, if the window is bounded on both sides.
    pub fn bounds(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        Some((self.start?, self.end?))
    }
}

// ============================================
// Sources
// ============================================

const SOURCE_PREFIX: &str = "irc.";
const SOURCE_SUFFIX: &str = ".weechatlog";

/// Stable name of a log source: `<network>.<#channel>`.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SourceIdentity(String);

impl SourceIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Derive the identity from a log path (`irc.<network>.<#channel>.weechatlog`).
    ///
    /// Returns `None` for file names outside that convention.
    pub fn from_path(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?;
        let name = file_name
            .strip_prefix(SOURCE_PREFIX)?
            .strip_suffix(SOURCE_SUFFIX)?;
        if !name.contains(".#") {
            return None;
        }
        Some(Self(name.to_string()))
    }

    /// Network token used to pick a noise filter: everything before the first `.#`.
    pub fn network(&self) -> &str {
        self.0.split_once(".#").map_or(self.0.as_str(), |(net, _)| net)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SourceIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================
// Activity
// ============================================

/// Activity statistics for one source over one window.
///
/// Totals are always derived from `participants`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub name: SourceIdentity,
    /// Counted events (bursts) per participant
    pub participants: BTreeMap<String, u64>,
}

impl ActivityRecord {
    pub fn new(name: SourceIdentity, participants: BTreeMap<String, u64>) -> Self {
        Self { name, participants }
    }

    /// Total counted events across all participants.
    pub fn message_count(&self) -> u64 {
        self.participants.values().sum()
    }

    /// Number of distinct participants.
    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// The `n` most active participants, busiest first; ties by name.
    pub fn top_participants(&self, n: usize) -> Vec<(&str, u64)> {
        let mut ranked: Vec<(&str, u64)> = self
            .participants
            .iter()
            .map(|(nick, count)| (nick.as_str(), *count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(n);
        ranked
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}

/// Numeric field used to rank activity records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Total counted messages
    #[default]
    Messages,
    /// Distinct participants
    Participants,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Messages => "messages",
            SortKey::Participants => "participants",
        }
    }

    /// The value of this key for a record.
    pub fn value(&self, record: &ActivityRecord) -> u64 {
        match self {
            SortKey::Messages => record.message_count(),
            SortKey::Participants => record.participant_count() as u64,
        }
    }
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "messages" | "msgs" => Ok(SortKey::Messages),
            "participants" | "nicks" => Ok(SortKey::Participants),
            _ => Err(format!("unknown sort key: {}", s)),
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
