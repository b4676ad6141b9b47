//! Ingestion layer for WeeChat log files
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐     ┌─────────────────┐
//! │  Source Files   │ ──► │    LogReader     │ ──► │   LogRecords    │
//! │ (~/.weechat/..) │     │  + classify      │     │ (per source)    │
//! └─────────────────┘     └──────────────────┘     └─────────────────┘
//! ```
//!
//! Sources are discovered with a glob over the log directory and narrowed
//! with a [`ChannelSelection`].

pub mod classify;
pub mod reader;

pub use reader::{LineError, LogReader, ParseMode, ReadResult};

use crate::error::{Error, Result};
use crate::types::SourceIdentity;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// File name pattern of channel logs inside the log directory.
pub const SOURCE_PATTERN: &str = "irc.*.#*.weechatlog";

/// A discovered channel log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSource {
    pub path: PathBuf,
    pub identity: SourceIdentity,
}

/// Channels to include or exclude, by `<network>.<#channel>` name.
///
/// Exclusion wins. An empty include set keeps everything not excluded.
#[derive(Debug, Clone, Default)]
pub struct ChannelSelection {
    pub include: HashSet<String>,
    pub exclude: HashSet<String>,
}

impl ChannelSelection {
    /// Select every channel.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn including<I, S>(channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            include: channels.into_iter().map(Into::into).collect(),
            exclude: HashSet::new(),
        }
    }

    pub fn excluding<I, S>(channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            include: HashSet::new(),
            exclude: channels.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether a source with this identity should be analyzed.
    pub fn wants(&self, identity: &SourceIdentity) -> bool {
        if self.exclude.contains(identity.as_str()) {
            return false;
        }
        self.include.is_empty() || self.include.contains(identity.as_str())
    }
}

/// Discover all channel logs in `log_dir` that `selection` wants.
///
/// Results are sorted by path. A missing directory is an error.
pub fn discover_sources(log_dir: &Path, selection: &ChannelSelection) -> Result<Vec<LogSource>> {
    if !log_dir.is_dir() {
        return Err(Error::LogDirNotFound(log_dir.to_path_buf()));
    }

    let root = glob::Pattern::escape(&log_dir.to_string_lossy());
    let full_pattern = Path::new(&root).join(SOURCE_PATTERN);
    let pattern_str = full_pattern.to_string_lossy();

    let entries = glob::glob(&pattern_str)
        .map_err(|e| Error::InvalidPattern(format!("{}: {}", pattern_str, e)))?;

    let mut sources = Vec::new();
    for entry in entries {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(error = %e, "Unreadable entry during discovery");
                continue;
            }
        };
        let Some(identity) = SourceIdentity::from_path(&path) else {
            continue;
        };
        if selection.wants(&identity) {
            sources.push(LogSource { path, identity });
        } else {
            tracing::debug!(source = %identity, "Source not selected, skipping");
        }
    }
    sources.sort_by(|a, b| a.path.cmp(&b.path));

    tracing::info!(
        log_dir = %log_dir.display(),
        count = sources.len(),
        "Discovered log sources"
    );

    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "").unwrap();
    }

    fn seeded_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "irc.freenode.#rust.weechatlog");
        touch(dir.path(), "irc.freenode.#node.js.weechatlog");
        touch(dir.path(), "irc.rizon.#anime.weechatlog");
        touch(dir.path(), "irc.server.freenode.weechatlog");
        touch(dir.path(), "core.weechat.weechatlog");
        touch(dir.path(), "irc.freenode.#rust.log");
        dir
    }

    fn names(sources: &[LogSource]) -> Vec<&str> {
        sources.iter().map(|s| s.identity.as_str()).collect()
    }

    #[test]
    fn test_discover_all_channels() {
        let dir = seeded_dir();
        let sources = discover_sources(dir.path(), &ChannelSelection::all()).unwrap();
        assert_eq!(
            names(&sources),
            vec!["freenode.#node.js", "freenode.#rust", "rizon.#anime"]
        );
    }

    #[test]
    fn test_discover_include_exclude() {
        let dir = seeded_dir();

        let only = ChannelSelection::including(["rizon.#anime", "efnet.#missing"]);
        let sources = discover_sources(dir.path(), &only).unwrap();
        assert_eq!(names(&sources), vec!["rizon.#anime"]);

        let without = ChannelSelection::excluding(["freenode.#rust"]);
        let sources = discover_sources(dir.path(), &without).unwrap();
        assert_eq!(names(&sources), vec!["freenode.#node.js", "rizon.#anime"]);
    }

    #[test]
    fn test_exclude_wins_over_include() {
        let selection = ChannelSelection {
            include: HashSet::from(["freenode.#rust".to_string()]),
            exclude: HashSet::from(["freenode.#rust".to_string()]),
        };
        assert!(!selection.wants(&SourceIdentity::new("freenode.#rust")));
    }

    #[test]
    fn test_missing_dir_is_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let err = discover_sources(&missing, &ChannelSelection::all()).unwrap_err();
        assert!(matches!(err, Error::LogDirNotFound(_)));
    }
}
