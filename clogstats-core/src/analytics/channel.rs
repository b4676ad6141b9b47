//! Per-channel activity analysis
//!
//! Folds one source's records into an [`ActivityRecord`]:
//!
//! 1. keep regular messages and actions that have a participant
//! 2. collapse consecutive lines from the same participant into one event
//! 3. drop noise participants (after collapsing, so a bot line between two
//!    bursts from the same nick still separates them)
//! 4. count events per participant

use crate::analytics::noise::NoiseSet;
use crate::types::{ActivityRecord, LogRecord, SourceIdentity};
use std::collections::BTreeMap;

/// Compute the activity record for one source.
///
/// `records` must be in encounter (file) order and already limited to the
/// window being analyzed.
pub fn analyze_channel<'a, I>(
    name: SourceIdentity,
    records: I,
    noise: NoiseSet<'_>,
) -> ActivityRecord
where
    I: IntoIterator<Item = &'a LogRecord>,
{
    let mut participants: BTreeMap<String, u64> = BTreeMap::new();
    let mut previous: Option<&str> = None;

    for record in records {
        if !record.msg_type.counts_as_activity() {
            continue;
        }
        let Some(nick) = record.participant.as_deref() else {
            continue;
        };
        if previous == Some(nick) {
            continue;
        }
        previous = Some(nick);

        if noise.contains(nick) {
            continue;
        }
        *participants.entry(nick.to_string()).or_insert(0) += 1;
    }

    ActivityRecord::new(name, participants)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::noise::NoiseFilters;
    use crate::ingest::reader::parse_line;
    use crate::types::MessageType;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 6, 19)
            .unwrap()
            .and_hms_opt(12, minute, 0)
            .unwrap()
    }

    fn record(minute: u32, msg_type: MessageType, nick: &str) -> LogRecord {
        LogRecord {
            timestamp: at(minute),
            msg_type,
            participant: Some(nick.to_string()),
            body: String::new(),
        }
    }

    fn msg(minute: u32, nick: &str) -> LogRecord {
        record(minute, MessageType::Message, nick)
    }

    fn name() -> SourceIdentity {
        SourceIdentity::new("freenode.#test")
    }

    #[test]
    fn test_burst_counts_once() {
        for run in 1..=6 {
            let records: Vec<_> = (0..run).map(|i| msg(i, "alice")).collect();
            let result = analyze_channel(name(), &records, NoiseSet::empty());
            assert_eq!(result.participants.get("alice"), Some(&1), "run of {run}");
            assert_eq!(result.message_count(), 1);
        }
    }

    #[test]
    fn test_interrupted_burst() {
        let mut records: Vec<_> = (0..5).map(|i| msg(i, "alice")).collect();
        records.push(record(5, MessageType::Action, "bob"));
        records.push(msg(6, "alice"));

        let result = analyze_channel(name(), &records, NoiseSet::empty());
        assert_eq!(
            result.participants,
            BTreeMap::from([("alice".to_string(), 2), ("bob".to_string(), 1)])
        );
        assert_eq!(result.message_count(), 3);
        assert_eq!(result.participant_count(), 2);
    }

    #[test]
    fn test_join_only_participant_not_counted() {
        let records = vec![
            record(0, MessageType::Join, "carol"),
            msg(1, "alice"),
            record(2, MessageType::Quit, "carol"),
        ];
        let result = analyze_channel(name(), &records, NoiseSet::empty());
        assert!(!result.participants.contains_key("carol"));
        assert_eq!(result.message_count(), 1);
        assert_eq!(result.participant_count(), 1);
    }

    #[test]
    fn test_non_activity_lines_do_not_break_bursts() {
        let records = vec![
            msg(0, "alice"),
            record(1, MessageType::Join, "bob"),
            LogRecord {
                timestamp: at(2),
                msg_type: MessageType::Network,
                participant: None,
                body: "topic changed".to_string(),
            },
            msg(3, "alice"),
        ];
        let result = analyze_channel(name(), &records, NoiseSet::empty());
        assert_eq!(result.participants.get("alice"), Some(&1));
    }

    #[test]
    fn test_noise_is_case_insensitive() {
        let filters = NoiseFilters::from_map([("freenode", ["Bot", "helper"])]);
        let records = vec![msg(0, "BOT"), msg(1, "alice"), msg(2, "Helper")];
        let result = analyze_channel(name(), &records, filters.for_network("freenode"));
        assert_eq!(
            result.participants,
            BTreeMap::from([("alice".to_string(), 1)])
        );
    }

    #[test]
    fn test_noise_removed_after_collapsing() {
        let filters = NoiseFilters::from_map([("freenode", ["bot"])]);
        let records = vec![msg(0, "alice"), msg(1, "bot"), msg(2, "alice")];
        let result = analyze_channel(name(), &records, filters.for_network("freenode"));
        assert_eq!(result.participants.get("alice"), Some(&2));
        assert!(!result.participants.contains_key("bot"));
    }

    #[test]
    fn test_mode_prefixed_bot_is_filtered() {
        let records: Vec<LogRecord> = [
            "2020-06-19 12:00:00\t@Bot\tbeep",
            "2020-06-19 12:01:00\t+alice\thi",
            "2020-06-19 12:02:00\t%BOT\tboop",
        ]
        .iter()
        .map(|line| parse_line(line).unwrap())
        .collect();
        assert_eq!(records[0].participant.as_deref(), Some("Bot"));

        let filters = NoiseFilters::from_map([("freenode", ["bot"])]);
        let result = analyze_channel(name(), &records, filters.for_network("freenode"));
        assert_eq!(
            result.participants,
            BTreeMap::from([("alice".to_string(), 1)])
        );
    }

    #[test]
    fn test_empty_source() {
        let result = analyze_channel(name(), &Vec::<LogRecord>::new(), NoiseSet::empty());
        assert!(result.is_empty());
        assert_eq!(result.message_count(), 0);
        assert_eq!(result.participant_count(), 0);
    }

    #[test]
    fn test_totals_match_mapping() {
        let nicks = ["a", "b", "a", "c", "c", "b", "a", "a", "d"];
        let records: Vec<_> = nicks
            .iter()
            .enumerate()
            .map(|(i, n)| msg(i as u32, n))
            .collect();
        let result = analyze_channel(name(), &records, NoiseSet::empty());
        assert_eq!(
            result.message_count(),
            result.participants.values().sum::<u64>()
        );
        assert_eq!(result.participant_count(), result.participants.len());
        assert_eq!(result.message_count(), 7);
    }
}
